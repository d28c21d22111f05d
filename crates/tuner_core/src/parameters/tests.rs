use std::collections::HashSet;

use super::*;

#[test]
fn test_grid_size_is_product_of_unique_values() {
    let space = ParameterSpace::grid()
        .w(RangeSpec::linspace(1.0, 10.0, 4))
        .b(RangeSpec::linspace(1.0, 10.0, 3))
        .mu(RangeSpec::step(0.0, 0.2, 0.1));
    let configs = space.generate().unwrap();
    assert_eq!(configs.len(), 4 * 3 * 3);
    assert_eq!(space.len().unwrap(), 36);

    let unique: HashSet<_> = configs.iter().cloned().collect();
    assert_eq!(unique.len(), configs.len());
}

#[test]
fn test_collapsed_dimension_counts_once() {
    let space = ParameterSpace::grid()
        .w(RangeSpec::linspace(5.0, 5.0, 10))
        .b(RangeSpec::linspace(1.0, 2.0, 2));
    let configs = space.generate().unwrap();
    assert_eq!(configs.len(), 2);
}

#[test]
fn test_canonical_nesting_order() {
    let space = ParameterSpace::grid()
        .w(RangeSpec::linspace(1.0, 2.0, 2))
        .b(RangeSpec::linspace(1.0, 2.0, 2))
        .mu(RangeSpec::linspace(0.0, 0.1, 2));
    let triples: Vec<(f64, f64, f64)> = space
        .generate()
        .unwrap()
        .iter()
        .map(|c| (c.w, c.b, c.mu))
        .collect();

    assert_eq!(
        triples,
        vec![
            (1.0, 1.0, 0.0),
            (1.0, 1.0, 0.1),
            (1.0, 2.0, 0.0),
            (1.0, 2.0, 0.1),
            (2.0, 1.0, 0.0),
            (2.0, 1.0, 0.1),
            (2.0, 2.0, 0.0),
            (2.0, 2.0, 0.1),
        ]
    );
}

#[test]
fn test_invalid_range_names_parameter() {
    let space = ParameterSpace::grid().b(RangeSpec::linspace(1.0, 2.0, 0));
    match space.generate() {
        Err(SweepError::Range { parameter, .. }) => assert_eq!(parameter, "b"),
        other => panic!("expected range error, got {other:?}"),
    }
}

#[test]
fn test_rounded_equality() {
    let a = ParameterConfig::new(1.004, 2.0, 0.1);
    let b = ParameterConfig::new(0.996, 2.0, 0.1);
    assert_eq!(a, b);
    assert_ne!(a, ParameterConfig::new(1.01, 2.0, 0.1));
}

#[test]
fn test_config_lines_order() {
    let config = ParameterConfig::new(1.0, 10.0, 0.1)
        .with_extra("r", Scalar::Float(0.5))
        .with_extra("g", Scalar::Int(3));
    assert_eq!(
        config.config_lines(),
        vec!["w = 1.0", "b = 10.0", "mu = 0.1", "D = 10", "g = 3", "r = 0.5"]
    );
}

#[test]
fn test_space_from_toml() {
    let space: ParameterSpace = toml::from_str(
        r#"
            w = "1,10,4"
            b = "1:3:1"
            D = 8
            [extra]
            garnet = false
        "#,
    )
    .unwrap();
    assert_eq!(space.w, RangeSpec::linspace(1.0, 10.0, 4));
    assert_eq!(space.b, RangeSpec::step(1.0, 3.0, 1.0));
    assert_eq!(space.mu, ParameterSpace::default().mu);
    assert_eq!(space.d, 8);
    assert_eq!(space.generate().unwrap().len(), 4 * 3 * 10);
}

#[test]
fn test_omitted_fields_match_default_space() {
    let defaults = ParameterSpace::default();

    let empty: ParameterSpace = toml::from_str("").unwrap();
    let partial: ParameterSpace = toml::from_str(r#"w = "2,4,3""#).unwrap();

    for space in [&empty, &partial] {
        assert_eq!(space.b, defaults.b);
        assert_eq!(space.mu, defaults.mu);
        assert_eq!(space.d, DEFAULT_DEPTH);
    }
    assert_eq!(empty.w, defaults.w);
    assert_eq!(partial.w, RangeSpec::linspace(2.0, 4.0, 3));
}
