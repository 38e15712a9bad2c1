//! 번들된 카탈로그로 생성한 소스 모듈의 형태를 확인한다.
use si_units_codegen::config::AmbiguityPolicy;
use si_units_codegen::index::DimensionIndex;
use si_units_codegen::quantity::{Catalog, MeasurementUnit, Quantity};
use si_units_codegen::render::{render_modules, GeneratedModule, RenderError};
use si_units_codegen::synth::{synthesize_conversions, synthesize_inverses};

fn render(catalog: &Catalog) -> Result<Vec<GeneratedModule>, RenderError> {
    let index = DimensionIndex::build(catalog);
    let policy = AmbiguityPolicy::default();
    let conversions = synthesize_conversions(catalog, &index, &policy).expect("conversions");
    let inverses = synthesize_inverses(catalog, &index, &policy).expect("inverses");
    render_modules(catalog, &conversions, &inverses)
}

fn bundled_modules() -> Vec<GeneratedModule> {
    let catalog = Catalog::from_toml(
        include_str!("../data/quantities.toml"),
        include_str!("../data/measurement-units.toml"),
    )
    .expect("bundled catalog");
    render(&catalog).expect("render")
}

fn module<'a>(modules: &'a [GeneratedModule], category: &str) -> &'a str {
    &modules
        .iter()
        .find(|m| m.category == category)
        .unwrap_or_else(|| panic!("no module {category}"))
        .source
}

#[test]
fn one_module_per_category() {
    let modules = bundled_modules();
    let files: Vec<&str> = modules.iter().map(|m| m.file_name.as_str()).collect();
    assert_eq!(
        files,
        [
            "base.rs",
            "chemical.rs",
            "electromagnetic.rs",
            "geometry.rs",
            "mechanical.rs",
            "nuclear.rs",
        ]
    );
}

#[test]
fn conversion_impls_cover_all_reference_variants() {
    let modules = bundled_modules();
    let base = module(&modules, "base");
    assert!(base.contains("use super::mechanical::*;"));
    assert!(!base.contains("use super::base::*;"));
    assert!(base.contains("// Mass * Acceleration -> Force"));
    assert!(base.contains("impl<T> core::ops::Mul<Acceleration<T>> for Mass<T> where T: NumLike {"));
    assert!(base.contains("impl<T> core::ops::Mul<&Acceleration<T>> for &Mass<T> where T: NumLike {"));
    assert!(base.contains("Force{N: self.kg * rhs.mps2}"));
    assert!(base.contains("Force{N: self.kg.clone() * rhs.mps2.clone()}"));
    assert!(base.contains("/// Multiplying a Mass by a Acceleration returns a value of type Force"));
}

#[test]
fn inverse_impls_are_feature_gated() {
    let modules = bundled_modules();
    let base = module(&modules, "base");
    assert!(base.contains("// 1/Time -> Frequency"));
    assert!(base.contains("impl<T> core::ops::Div<Time<T>> for f64 where T: NumLike+From<f64> {"));
    assert!(base.contains(
        "#[cfg(feature=\"num-complex\")]\nimpl<T> core::ops::Div<Time<T>> for num_complex::Complex32"
    ));
    assert!(base.contains("Frequency{Hz: T::from(self.clone()) / rhs.s.clone()}"));
    assert!(base.contains("use num_bigfloat;"));
    assert!(base.contains("use num_complex;"));
    assert!(!base.contains("use num_rational;"));

    // num-rational 타입으로 구체화되는 impl이 없으므로 import도 없다
    let chemical = module(&modules, "chemical");
    assert!(!chemical.contains("use num_rational;"));
    assert!(chemical.contains("#[cfg(feature=\"serde\")]\nuse serde::{Serialize, Deserialize};"));
}

#[test]
fn extended_scalar_types_multiply_units() {
    let modules = bundled_modules();
    let chemical = module(&modules, "chemical");
    assert!(chemical.contains("#[cfg(feature=\"num-bigfloat\")]\nuse num_bigfloat;"));
    assert!(chemical.contains("#[cfg(feature=\"num-complex\")]\nuse num_complex;"));

    let base = module(&modules, "base");
    assert!(base.contains(
        "#[cfg(feature=\"num-bigfloat\")]\n\
         impl core::ops::Mul<Mass<num_bigfloat::BigFloat>> for num_bigfloat::BigFloat {"
    ));
    assert!(base.contains("\tfn mul(self, rhs: &Mass<num_complex::Complex64>) -> Self::Output {"));
    assert!(base.contains("Mass{kg: self.clone() * rhs.kg.clone()}"));
    assert!(base.contains("Mass{kg: self * rhs.kg}"));
}

#[test]
fn measurement_unit_methods() {
    let modules = bundled_modules();
    let base = module(&modules, "base");
    assert!(base.contains(
        "\t/// # Arguments\n\
         \t/// * `moles` - Any number-like type, representing a quantity of moles\n\
         \tpub fn from_moles(moles: T) -> Self { Amount{mol: moles} }"
    ));
    assert!(base.contains("pub fn to_moles(&self) -> T { self.mol.clone() }"));
    assert!(base.contains("impl<T> Temperature<T> where T: NumLike+From<f64> {"));
    assert!(base.contains("return (self.K.clone() - T::from(273.15_f64)) * T::from(1.0_f64);"));
    assert!(base.contains("Temperature{K: C * T::from(1.0_f64) + T::from(273.15_f64)}"));
    assert!(base.contains("return self.m.clone() * T::from(0.001_f64);"));
    assert!(base.contains("Distance{m: km * T::from(1000.0_f64)}"));
}

#[test]
fn struct_header_and_display() {
    let modules = bundled_modules();
    let mechanical = module(&modules, "mechanical");
    assert!(mechanical.starts_with("//! This module provides mechanical SI units, such as acceleration\n"));
    assert!(mechanical.contains("pub struct AngularAcceleration<T: NumLike>{"));
    assert!(mechanical.contains("pub fn unit_symbol() -> &'static str { \"m/s\" }"));
    assert!(mechanical.contains("impl<T> fmt::Display for Velocity<T> where T: NumLike {"));
}

#[test]
fn non_finite_coefficients_are_rejected() {
    let quantity = Quantity {
        category: "base".to_string(),
        name: "mass".to_string(),
        dimension: "kg".to_string(),
        unit_symbol: "kg".to_string(),
        unit_name: "kilograms".to_string(),
        desc_first_name: "mass".to_string(),
        desc_name: "mass".to_string(),
        unit_symbol_human: None,
    };
    let unit = MeasurementUnit {
        name: "mass".to_string(),
        unit_name: "broken".to_string(),
        unit_symbol: "broken".to_string(),
        slope: f64::INFINITY,
        offset: None,
        inverse_slope: 0.0,
    };
    let catalog = Catalog::new(vec![quantity], vec![unit]).expect("catalog");
    match render(&catalog) {
        Err(RenderError::NonFiniteCoefficient { quantity, unit }) => {
            assert_eq!(quantity, "mass");
            assert_eq!(unit, "broken");
        }
        other => panic!("unexpected {other:?}"),
    }
}
