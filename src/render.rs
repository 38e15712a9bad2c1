//! 합성된 규칙을 분류별 Rust 소스 모듈로 렌더링한다.

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use crate::quantity::{Catalog, MeasurementUnit, Quantity};
use crate::synth::{ConversionRule, InverseRule, InverseSynthesis, Representation};

/// 렌더링 시 발생 가능한 오류.
#[derive(Debug)]
pub enum RenderError {
    /// 문자열 버퍼 쓰기 실패
    Fmt(fmt::Error),
    /// 코드 리터럴로 쓸 수 없는 환산 계수
    NonFiniteCoefficient { quantity: String, unit: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Fmt(e) => write!(f, "소스 생성 오류: {e}"),
            RenderError::NonFiniteCoefficient { quantity, unit } => {
                write!(f, "'{quantity}'의 측정 단위 '{unit}' 계수가 유한하지 않음")
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<fmt::Error> for RenderError {
    fn from(value: fmt::Error) -> Self {
        RenderError::Fmt(value)
    }
}

/// 분류 하나에 해당하는 생성 모듈.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub category: String,
    pub file_name: String,
    pub source: String,
}

/// 첫 글자만 대문자로, 나머지는 소문자로 바꾼다.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `"angular acceleration"` → `"AngularAcceleration"`.
pub fn code_name(name: &str) -> String {
    name.split(' ').map(capitalize).collect()
}

const OPTIONAL_IMPORTS: [(&str, &str); 3] = [
    ("num-bigfloat", "use num_bigfloat;"),
    ("num-complex", "use num_complex;"),
    ("num-rational", "use num_rational;"),
];

/// 분류별로 모듈을 렌더링한다(분류 이름순).
pub fn render_modules(
    catalog: &Catalog,
    conversions: &[ConversionRule],
    inverses: &InverseSynthesis,
) -> Result<Vec<GeneratedModule>, RenderError> {
    catalog
        .categories()
        .into_iter()
        .map(|category| {
            let source = render_module(category, catalog, conversions, inverses)?;
            Ok(GeneratedModule {
                category: category.to_string(),
                file_name: format!("{category}.rs"),
                source: strip_unused_feature_imports(&source),
            })
        })
        .collect()
}

fn render_module(
    category: &str,
    catalog: &Catalog,
    conversions: &[ConversionRule],
    inverses: &InverseSynthesis,
) -> Result<String, RenderError> {
    let members: Vec<&Quantity> = catalog
        .entries()
        .iter()
        .map(|e| &e.quantity)
        .filter(|q| q.category == category)
        .collect();
    let mut out = String::new();
    if let (Some(first), Some(second)) = (
        members.first(),
        members.get((1 + members.len() / 2).min(members.len().saturating_sub(1))),
    ) {
        writeln!(out, "//! This module provides {category} SI units, such as {}", first.desc_first_name)?;
        writeln!(out, "//! and {}.", second.desc_first_name)?;
    }
    writeln!(out, "use core::fmt;")?;
    writeln!(out, "use super::UnitStruct;")?;
    writeln!(out, "use super::NumLike;")?;
    for import in module_imports(category, catalog, conversions, inverses) {
        writeln!(out, "use super::{import}::*;")?;
    }
    writeln!(out)?;
    writeln!(out, "// optional supports")?;
    writeln!(out, "#[cfg(feature=\"serde\")]")?;
    writeln!(out, "use serde::{{Serialize, Deserialize}};")?;
    for (feature, import) in OPTIONAL_IMPORTS {
        writeln!(out, "#[cfg(feature=\"{feature}\")]")?;
        writeln!(out, "{import}")?;
    }
    for quantity in members {
        let units: Vec<&MeasurementUnit> = catalog.units_of(&quantity.name).collect();
        write_unit_struct(&mut out, quantity, &units)?;
        write_extended_scalar_ops(&mut out, quantity)?;
        for rule in conversions.iter().filter(|r| r.left == quantity.name) {
            write_conversion(&mut out, rule)?;
        }
        for rule in inverses.rules.iter().filter(|r| r.right == quantity.name) {
            write_inverse(&mut out, rule)?;
        }
    }
    Ok(out)
}

/// 다른 분류 모듈에서 가져와야 하는 모듈 이름(정렬, 자기 자신 제외).
fn module_imports(
    category: &str,
    catalog: &Catalog,
    conversions: &[ConversionRule],
    inverses: &InverseSynthesis,
) -> BTreeSet<String> {
    let category_of = |name: &str| catalog.get(name).map(|e| e.quantity.category.clone());
    let is_local = |name: &str| category_of(name).as_deref() == Some(category);
    let mut imports = BTreeSet::new();
    for rule in conversions.iter().filter(|r| is_local(&r.left)) {
        imports.extend(category_of(&rule.right));
        imports.extend(category_of(&rule.result));
    }
    for rule in inverses.rules.iter().filter(|r| is_local(&r.right)) {
        imports.extend(category_of(&rule.result));
    }
    imports.remove(category);
    imports
}

fn write_unit_struct(
    out: &mut String,
    q: &Quantity,
    units: &[&MeasurementUnit],
) -> Result<(), RenderError> {
    let code = code_name(&q.name);
    let sym = &q.unit_symbol;
    writeln!(out)?;
    writeln!(out, "/// The {} unit type, defined as {} in SI units", q.desc_first_name, q.unit_name)?;
    writeln!(out, "#[derive(UnitStruct, Debug, Clone)]")?;
    writeln!(out, "#[cfg_attr(feature=\"serde\", derive(Serialize, Deserialize))]")?;
    writeln!(out, "pub struct {code}<T: NumLike>{{")?;
    writeln!(out, "\t/// The value of this {} in {}", capitalize(&q.desc_name), q.unit_name)?;
    writeln!(out, "\tpub {sym}: T")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl<T> {code}<T> where T: NumLike {{")?;
    writeln!(out)?;
    writeln!(out, "\t/// Returns the standard unit name of {}: \"{}\"", q.desc_name, q.unit_name)?;
    writeln!(out, "\tpub fn unit_name() -> &'static str {{ \"{}\" }}", q.unit_name)?;
    writeln!(out, "\t")?;
    writeln!(
        out,
        "\t/// Returns the abbreviated name or symbol of {}: \"{}\" for {}",
        q.desc_name,
        q.human_symbol(),
        q.unit_name
    )?;
    writeln!(out, "\tpub fn unit_symbol() -> &'static str {{ \"{}\" }}", q.human_symbol())?;
    for unit in units.iter().filter(|u| u.is_identity()) {
        let user = &unit.unit_symbol;
        writeln!(out)?;
        writeln!(out, "\t/// Returns a new {} value from the given number of {}", q.desc_name, unit.unit_name)?;
        writeln!(out, "\t///")?;
        writeln!(out, "\t/// # Arguments")?;
        writeln!(out, "\t/// * `{user}` - Any number-like type, representing a quantity of {}", q.unit_name)?;
        writeln!(out, "\tpub fn from_{user}({user}: T) -> Self {{ {code}{{{sym}: {user}}} }}")?;
        writeln!(out, "\t")?;
        writeln!(out, "\t/// Returns a copy of this {} value in {}", q.desc_name, unit.unit_name)?;
        writeln!(out, "\tpub fn to_{user}(&self) -> T {{ self.{sym}.clone() }}")?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl<T> fmt::Display for {code}<T> where T: NumLike {{")?;
    writeln!(out, "\tfn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{")?;
    writeln!(out, "\t\twrite!(f, \"{{}} {{}}\", &self.{sym}, Self::unit_symbol())")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "}}")?;

    let scaled: Vec<&&MeasurementUnit> = units.iter().filter(|u| !u.is_identity()).collect();
    if scaled.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "impl<T> {code}<T> where T: NumLike+From<f64> {{")?;
    for unit in scaled {
        write_scaled_methods(out, q, unit)?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// 저장값 기준 `to = (stored - offset) * inverse_slope`, `from = value * slope + offset`.
fn write_scaled_methods(out: &mut String, q: &Quantity, unit: &MeasurementUnit) -> Result<(), RenderError> {
    let offset = unit.effective_offset();
    if !(unit.slope.is_finite() && unit.inverse_slope.is_finite() && offset.is_finite()) {
        return Err(RenderError::NonFiniteCoefficient {
            quantity: q.name.clone(),
            unit: unit.unit_name.clone(),
        });
    }
    let code = code_name(&q.name);
    let sym = &q.unit_symbol;
    let user = &unit.unit_symbol;
    let (to_expr, from_expr) = if offset == 0.0 {
        (
            format!("self.{sym}.clone() * T::from({:?}_f64)", unit.inverse_slope),
            format!("{user} * T::from({:?}_f64)", unit.slope),
        )
    } else {
        (
            format!(
                "(self.{sym}.clone() - T::from({offset:?}_f64)) * T::from({:?}_f64)",
                unit.inverse_slope
            ),
            format!("{user} * T::from({:?}_f64) + T::from({offset:?}_f64)", unit.slope),
        )
    };
    writeln!(out, "\t")?;
    writeln!(out, "\t/// Returns a copy of this {} value in {}", q.desc_name, unit.unit_name)?;
    writeln!(out, "\t/// ")?;
    writeln!(out, "\t/// *Note: This method is not available for `f32` and other number types lacking the `From<f64>` trait*")?;
    writeln!(out, "\tpub fn to_{user}(&self) -> T {{")?;
    writeln!(out, "\t\treturn {to_expr};")?;
    writeln!(out, "\t}}")?;
    writeln!(out)?;
    writeln!(out, "\t/// Returns a new {} value from the given number of {}", q.desc_name, unit.unit_name)?;
    writeln!(out, "\t/// ")?;
    writeln!(out, "\t/// *Note: This method is not available for `f32` and other number types lacking the `From<f64>` trait*")?;
    writeln!(out, "\t///")?;
    writeln!(out, "\t/// # Arguments")?;
    writeln!(out, "\t/// * `{user}` - Any number-like type, representing a quantity of {}", unit.unit_name)?;
    writeln!(out, "\tpub fn from_{user}({user}: T) -> Self {{")?;
    writeln!(out, "\t\t{code}{{{sym}: {from_expr}}}")?;
    writeln!(out, "\t}}")?;
    Ok(())
}

/// 제네릭 `T * Unit<T>`를 쓸 수 없는 외부 수치 타입에 대해 `scalar * Unit<scalar>`를 구체 타입으로 만든다.
fn write_extended_scalar_ops(out: &mut String, q: &Quantity) -> Result<(), RenderError> {
    let code = code_name(&q.name);
    let sym = &q.unit_symbol;
    for representation in Representation::ALL {
        let Some(feature) = representation.feature() else {
            continue;
        };
        let scalar = representation.type_path();
        writeln!(out)?;
        for (sref, rref) in REF_VARIANTS {
            writeln!(out, "/// Multiplying a unit value by a scalar value returns a unit value")?;
            writeln!(out, "#[cfg(feature=\"{feature}\")]")?;
            writeln!(out, "impl core::ops::Mul<{rref}{code}<{scalar}>> for {sref}{scalar} {{")?;
            writeln!(out, "\ttype Output = {code}<{scalar}>;")?;
            writeln!(out, "\tfn mul(self, rhs: {rref}{code}<{scalar}>) -> Self::Output {{")?;
            writeln!(
                out,
                "\t\t{code}{{{sym}: self{} * rhs.{sym}{}}}",
                clone_if_ref(sref),
                clone_if_ref(rref)
            )?;
            writeln!(out, "\t}}")?;
            writeln!(out, "}}")?;
        }
    }
    Ok(())
}

/// 값/참조 조합 네 가지. `(self 쪽, rhs 쪽)` 접두사.
const REF_VARIANTS: [(&str, &str); 4] = [("", ""), ("&", ""), ("", "&"), ("&", "&")];

fn clone_if_ref(reference: &str) -> &'static str {
    if reference.is_empty() {
        ""
    } else {
        ".clone()"
    }
}

fn write_conversion(out: &mut String, rule: &ConversionRule) -> Result<(), RenderError> {
    let left = code_name(&rule.left);
    let right = code_name(&rule.right);
    let result = code_name(&rule.result);
    let trait_name = rule.operator.trait_name();
    let function = rule.operator.function_name();
    let op = rule.operator.symbol();
    let doc = format!(
        "/// {} a {left} by a {right} returns a value of type {result}",
        capitalize(rule.verbing())
    );
    writeln!(out)?;
    writeln!(out, "// {left} {op} {right} -> {result}")?;
    for (lref, rref) in REF_VARIANTS {
        writeln!(out, "{doc}")?;
        writeln!(
            out,
            "impl<T> core::ops::{trait_name}<{rref}{right}<T>> for {lref}{left}<T> where T: NumLike {{"
        )?;
        writeln!(out, "\ttype Output = {result}<T>;")?;
        writeln!(out, "\tfn {function}(self, rhs: {rref}{right}<T>) -> Self::Output {{")?;
        writeln!(
            out,
            "\t\t{result}{{{}: self.{}{} {op} rhs.{}{}}}",
            rule.result_symbol,
            rule.left_symbol,
            clone_if_ref(lref),
            rule.right_symbol,
            clone_if_ref(rref)
        )?;
        writeln!(out, "\t}}")?;
        writeln!(out, "}}")?;
    }
    Ok(())
}

fn write_inverse(out: &mut String, rule: &InverseRule) -> Result<(), RenderError> {
    let right = code_name(&rule.right);
    let result = code_name(&rule.result);
    let scalar = rule.representation.type_path();
    let cfg = match rule.representation.feature() {
        Some(feature) => format!("#[cfg(feature=\"{feature}\")]\n"),
        None => String::new(),
    };
    writeln!(out)?;
    writeln!(out, "// 1/{right} -> {result}")?;
    for (sref, rref) in REF_VARIANTS {
        let value = if sref.is_empty() { "self" } else { "self.clone()" };
        writeln!(out, "/// Dividing a scalar value by a {right} unit value returns a value of type {result}")?;
        write!(out, "{cfg}")?;
        writeln!(
            out,
            "impl<T> core::ops::Div<{rref}{right}<T>> for {sref}{scalar} where T: NumLike+From<{scalar}> {{"
        )?;
        writeln!(out, "\ttype Output = {result}<T>;")?;
        writeln!(out, "\tfn div(self, rhs: {rref}{right}<T>) -> Self::Output {{")?;
        writeln!(
            out,
            "\t\t{result}{{{}: T::from({value}) / rhs.{}{}}}",
            rule.result_symbol,
            rule.right_symbol,
            clone_if_ref(rref)
        )?;
        writeln!(out, "\t}}")?;
        writeln!(out, "}}")?;
    }
    Ok(())
}

/// 해당 feature로 감싼 `impl`이 하나도 없으면 그 feature의 `use` 구문을 지운다.
fn strip_unused_feature_imports(code: &str) -> String {
    let mut code = code.to_string();
    for (feature, import) in OPTIONAL_IMPORTS {
        let gate = format!("#[cfg(feature=\"{feature}\")]\n");
        if !code.contains(&format!("{gate}impl")) {
            code = code.replace(&format!("{gate}{import}\n"), "");
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_names_are_camel_case() {
        assert_eq!(code_name("angular acceleration"), "AngularAcceleration");
        assert_eq!(code_name("mass"), "Mass");
        assert_eq!(code_name("inverse dose equivalent"), "InverseDoseEquivalent");
    }

    #[test]
    fn unused_feature_imports_are_removed() {
        let code = "#[cfg(feature=\"num-complex\")]\nuse num_complex;\n\
                    #[cfg(feature=\"num-bigfloat\")]\nuse num_bigfloat;\n\
                    #[cfg(feature=\"num-bigfloat\")]\nimpl Foo for Bar {}\n";
        let stripped = strip_unused_feature_imports(code);
        assert!(!stripped.contains("use num_complex;"));
        assert!(stripped.contains("use num_bigfloat;"));
    }
}
