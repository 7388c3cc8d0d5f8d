//! Integration tests for the factorization pipeline.

use polyfactor::prelude::*;
use polyfactor::factor::{encode, merge, name_outputs, NameGenerator};
use polyfactor::parse_and_factor;

const SCENARIO: &str = r#"
    # three accesses over the same 4-d domain
    [N] -> { S[i, j, k, l] -> [j, k] }
    [N] -> { S[i, j, k, l] -> [k - j] }
    [N] -> { S[i, j, k, l] -> [j - k, i - j - k + l] }
"#;

fn assert_round_trips(maps: &[AffineMap], result: &Factorization) {
    assert_eq!(maps.len(), result.projections.len());
    for (idx, (original, projection)) in result.entries(maps).enumerate() {
        assert_eq!(projection.n_in(), result.rank(), "projection {} input dims", idx);
        assert_eq!(projection.n_param(), 0, "projection {} has parameters", idx);
        let recombined = projection.pullback(&result.common_factor);
        assert!(recombined.plain_is_equal(original), "map {}: {} != {}", idx, recombined, original);
    }
}

#[test]
fn test_scenario_pipeline() {
    let maps = parse_maps(SCENARIO).expect("Failed to parse");
    assert_eq!(maps.len(), 3);

    let result = factor_with_config(&maps, &FactorConfig::new().verify(true)).expect("Failed to factor");
    assert_eq!(result.factors.q.nrows(), 5);
    assert_eq!(result.rank(), 3);
    assert_eq!(result.common_factor.n_in(), 4);
    assert_eq!(result.common_factor.space.params, vec!["N".to_string()]);
    assert_round_trips(&maps, &result);
}

#[test]
fn test_rank_matches_rational_rank() {
    let sources = [
        SCENARIO,
        "{ [i, j] -> [i + j] } { [i, j] -> [2i + 2j] } { [i, j] -> [i - j, 3] }",
        "[N, M] -> { [i] -> [N + i, M] } [N, M] -> { [i] -> [N + M + i] }",
        "{ [i, j, k] -> [0, 0] }",
    ];
    for source in sources {
        let maps = parse_maps(source).unwrap();
        let mut names = NameGenerator::default();
        let merged = merge(&name_outputs(&maps, &mut names)).unwrap();
        let matrix = encode(&merged).unwrap();

        let result = factor(&maps).unwrap();
        assert_eq!(result.rank(), matrix.rank(), "rank of {}", source);
        assert_eq!(result.rank(), matrix.to_rational().rank());
        assert!(result.rank() <= merged.n_out());
        assert_round_trips(&maps, &result);
    }
}

#[test]
fn test_zero_outputs_give_empty_mid_space() {
    let maps = parse_maps("{ [i, j, k] -> [0, 0] }").unwrap();
    let result = factor(&maps).unwrap();
    assert_eq!(result.rank(), 0);
    assert_eq!(result.projections[0].apply(&[], &[]), vec![0, 0]);
}

#[test]
fn test_naming_is_deterministic_and_order_sensitive() {
    let maps = parse_maps("{ [i] -> [i, 2i] } { [i] -> [3i] }").unwrap();

    let first = name_outputs(&maps, &mut NameGenerator::default());
    let second = name_outputs(&maps, &mut NameGenerator::default());
    assert_eq!(first, second);
    assert_eq!(first[1].space.dim_name(DimKind::Out, 0), Some("orig_out_2"));

    let reversed: Vec<AffineMap> = maps.iter().rev().cloned().collect();
    let tagged = name_outputs(&reversed, &mut NameGenerator::default());
    assert_eq!(tagged[0].space.dim_name(DimKind::Out, 0), Some("orig_out_0"));
    assert_eq!(tagged[1].space.dim_name(DimKind::Out, 1), Some("orig_out_2"));

    // inputs are copied, never renamed in place
    assert_eq!(maps[0].space.dim_name(DimKind::Out, 0), None);
}

#[test]
fn test_factor_is_deterministic() {
    let maps = parse_maps(SCENARIO).unwrap();
    assert_eq!(factor(&maps).unwrap(), factor(&maps).unwrap());
}

#[test]
fn test_divisional_input_rejected_and_left_unmodified() {
    let maps = parse_maps(
        "{ [i, j] -> [i + j] }
         { [i, j] -> [floor((i)/2)] }",
    )
    .unwrap();
    let before = maps.clone();

    let err = factor(&maps).unwrap_err();
    assert_eq!(err.kind, FactorErrorKind::UnsupportedDimensionKind);
    assert!(!err.is_internal());
    assert_eq!(maps, before);
}

#[test]
fn test_single_map() {
    let maps = vec![parse_map("[N] -> { [i, j] -> [i, j + 1] }").unwrap()];
    let result = factor(&maps).unwrap();
    assert_eq!(result.rank(), 2);
    assert_eq!(result.projections.len(), 1);
    assert!(result.projections[0].is_identity());
    assert_round_trips(&maps, &result);
}

// The projection of a single map is the identity only when its rows are
// already in Hermite form (see "Single-map input" in DESIGN.md). Otherwise
// it is the recombination matrix, and only the round trip is guaranteed.
#[test]
fn test_single_map_general_position() {
    let maps = vec![parse_map("{ [i, j] -> [i + j, i - j] }").unwrap()];
    let result = factor(&maps).unwrap();
    assert_eq!(result.rank(), 2);
    assert_round_trips(&maps, &result);
}

#[test]
fn test_duplicate_maps_keep_separate_entries() {
    let map = parse_map("{ A[i, j] -> B[x = 2i - j] }").unwrap();
    let maps = vec![map.clone(), map];
    let result = factor(&maps).unwrap();
    assert_eq!(result.rank(), 1);
    assert_eq!(result.projections.len(), 2);
    assert_eq!(result.projections[0], result.projections[1]);
    assert_eq!(result.projections[0].space.out_tuple.as_deref(), Some("B"));
    assert_round_trips(&maps, &result);
}

#[test]
fn test_coefficient_growth_is_reported() {
    let maps = parse_maps(
        "{ [i, j, k] -> [1000000007 i + 998244353 j + 3 k, \
                         999999937 i + 1000000009 j + 7 k, \
                         123456789 i + 987654321 j + 1000003 k] }",
    )
    .unwrap();
    let before = maps.clone();

    for config in [FactorConfig::new().verify(false), FactorConfig::new().verify(true)] {
        let err = factor_with_config(&maps, &config).unwrap_err();
        assert_eq!(err.kind, FactorErrorKind::Overflow);
    }
    assert_eq!(maps, before);
}

#[test]
fn test_zero_multiple_of_floor_is_affine() {
    let maps = parse_maps("{ [i, j] -> [i + 0*floor((i)/2)] } { [i, j] -> [j] }").unwrap();
    assert!(maps.iter().all(|m| !m.has_divs()));

    let result = factor_with_config(&maps, &FactorConfig::new().verify(true)).unwrap();
    assert_eq!(result.rank(), 2);
    assert!(result.verify(&maps));

    let unverified = factor_with_config(&maps, &FactorConfig::new().verify(false)).unwrap();
    assert!(unverified.verify(&maps));
    assert_round_trips(&maps, &unverified);
}

#[test]
fn test_domain_mismatch() {
    let maps = parse_maps("{ [i, j] -> [i] } { [i] -> [i] }").unwrap();
    let err = factor(&maps).unwrap_err();
    assert_eq!(err.kind, FactorErrorKind::InvalidDomainMismatch);

    let maps = parse_maps("[N] -> { [i] -> [i] } [M] -> { [i] -> [i] }").unwrap();
    assert_eq!(factor(&maps).unwrap_err().kind, FactorErrorKind::InvalidDomainMismatch);

    assert_eq!(factor(&[]).unwrap_err().kind, FactorErrorKind::InvalidDomainMismatch);
}

#[test]
fn test_parameter_order_is_aligned_by_name() {
    let maps = parse_maps("[N, M] -> { [i] -> [N + i] } [M, N] -> { [i] -> [M - i] }").unwrap();
    let result = factor(&maps).unwrap();
    assert_round_trips(&maps, &result);
}

#[test]
fn test_parse_print_round_trip() {
    let maps = parse_maps(SCENARIO).unwrap();
    let result = factor(&maps).unwrap();
    for map in std::iter::once(&result.common_factor).chain(&result.projections) {
        let printed = map.to_string();
        let reparsed = parse_map(&printed).unwrap_or_else(|e| panic!("{}: {}", printed, e));
        assert_eq!(&reparsed, map);
    }
}

#[test]
fn test_parse_and_factor_report() {
    let (maps, result) = parse_and_factor(SCENARIO, &FactorConfig::new()).unwrap();
    let mut printer = PolyPrinter::new();
    printer.print_factorization(&maps, &result);
    let report = printer.take_output();
    assert!(report.contains("rank 3"));
    assert!(report.contains("mid_1"));
    assert_eq!(report.matches("projection:").count(), 3);
}
