//! 차원 대수의 성질 회귀 테스트.
use si_units_codegen::dimension::{condense, expand, DimensionError, DimensionVector};

const EXPRESSIONS: [&str; 12] = [
    "kg",
    "1/s",
    "m/s^2",
    "kg.m/s^2",
    "kg.m^2/s^2",
    "kg/m.s^2",
    "A^2.s^4/kg.m^2",
    "kg.m^2/A.s^3",
    "mol/s/m^3",
    "cd.sr/m^2",
    "kg.m^2.rad/s",
    "s.m/s.m",
];

fn dim(expr: &str) -> DimensionVector {
    DimensionVector::parse(expr).unwrap_or_else(|e| panic!("{expr}: {e}"))
}

#[test]
fn canonicalization_is_idempotent() {
    for expr in EXPRESSIONS {
        let once = dim(expr);
        let twice = DimensionVector::new(once.numerator().to_vec(), once.denominator().to_vec());
        assert_eq!(once, twice, "{expr}");
    }
}

#[test]
fn no_token_on_both_sides() {
    for expr in EXPRESSIONS {
        let d = dim(expr);
        assert!(
            d.numerator().iter().all(|t| !d.denominator().contains(t)),
            "{expr} -> {d}"
        );
    }
}

#[test]
fn multiplying_by_inverse_is_dimensionless() {
    for expr in EXPRESSIONS {
        let d = dim(expr);
        let product = d.multiply(&d.invert());
        assert!(product.is_dimensionless(), "{expr} -> {product}");
        assert!(product.numerator().is_empty() && product.denominator().is_empty());
    }
}

#[test]
fn multiply_commutes_divide_does_not() {
    for a in EXPRESSIONS {
        for b in EXPRESSIONS {
            let (da, db) = (dim(a), dim(b));
            assert_eq!(da.multiply(&db), db.multiply(&da), "{a} * {b}");
            if da != db {
                assert_ne!(da.divide(&db), db.divide(&da), "{a} / {b}");
            } else {
                assert_eq!(da.divide(&db), db.divide(&da));
            }
        }
    }
}

#[test]
fn divide_is_multiply_by_inverse() {
    let a = dim("kg.m^2/s^2");
    let b = dim("m/s");
    assert_eq!(a.divide(&b), a.multiply(&b.invert()));
    assert_eq!(&a / &b, dim("kg.m/s"));
}

#[test]
fn render_round_trips_through_parse() {
    for expr in EXPRESSIONS {
        let d = dim(expr);
        let rendered = d.to_string();
        assert_eq!(dim(&rendered), d, "{expr} -> {rendered}");
        assert_eq!(dim(&rendered).to_string(), rendered);
    }
}

#[test]
fn power_expansion_and_condensation() {
    let cubed = expand("kg^3").expect("expand");
    assert_eq!(condense(&cubed), "kg^3");
    assert_eq!(cubed, expand("kg.kg.kg").expect("expand"));
    assert_eq!(dim("kg^3"), dim("kg.kg.kg"));
    assert_eq!(expand("1").expect("expand"), Vec::<String>::new());
}

#[test]
fn inverted_force_renders_denominator_first() {
    let inverse = dim("kg.m/s^2").invert();
    assert_eq!(inverse.to_string(), "s^2/kg.m");
    assert_eq!(inverse, dim("s^2/kg.m"));
}

#[test]
fn equality_is_multiset_not_sequence() {
    assert_eq!(dim("m.kg/s"), dim("kg.m/s"));
    assert_eq!(dim("s.kg.m/s^2"), dim("m.kg/s"));
    assert_ne!(dim("kg.m/s"), dim("kg.m.m/s"));
}

#[test]
fn equal_vectors_hash_equal() {
    use std::collections::HashSet;
    let set: HashSet<DimensionVector> = ["kg.m/s^2", "m.kg/s.s", "kg.m.s/s^3"]
        .iter()
        .map(|e| dim(e))
        .collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn format_errors_carry_the_expression() {
    let err = DimensionVector::parse("kg.m^0/s").expect_err("zero power");
    match err {
        DimensionError::Format { expression, .. } => assert_eq!(expression, "kg.m^0/s"),
        other => panic!("unexpected error {other:?}"),
    }
}
