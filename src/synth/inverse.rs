use std::fmt;
use tracing::{debug, info};

use crate::config::AmbiguityPolicy;
use crate::index::DimensionIndex;
use crate::quantity::{Catalog, CatalogEntry, MeasurementUnit, Quantity};
use super::conversion::RuleError;

/// 역수 규칙을 구체화할 수치 타입.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    F64,
    F32,
    I64,
    I32,
    BigFloat,
    Complex32,
    Complex64,
}

impl Representation {
    /// 역수 규칙마다 빠짐없이 생성되는 타입 목록. 순서가 생성 코드의 순서다.
    pub const ALL: [Representation; 7] = [
        Representation::F64,
        Representation::F32,
        Representation::I64,
        Representation::I32,
        Representation::BigFloat,
        Representation::Complex32,
        Representation::Complex64,
    ];

    pub fn type_path(self) -> &'static str {
        match self {
            Representation::F64 => "f64",
            Representation::F32 => "f32",
            Representation::I64 => "i64",
            Representation::I32 => "i32",
            Representation::BigFloat => "num_bigfloat::BigFloat",
            Representation::Complex32 => "num_complex::Complex32",
            Representation::Complex64 => "num_complex::Complex64",
        }
    }

    /// 생성 코드에서 이 타입을 감싸는 cargo feature.
    pub fn feature(self) -> Option<&'static str> {
        match self {
            Representation::BigFloat => Some("num-bigfloat"),
            Representation::Complex32 | Representation::Complex64 => Some("num-complex"),
            _ => None,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_path())
    }
}

/// `1 / right = result` 규칙(수치 타입 하나당 한 개).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverseRule {
    pub right: String,
    pub right_symbol: String,
    pub result: String,
    pub result_symbol: String,
    pub representation: Representation,
}

/// 역수 물리량이 카탈로그에 없을 때 제안하는 새 물리량.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedQuantity {
    /// 제안의 근거가 된 물리량
    pub source: String,
    pub quantity: Quantity,
}

/// 역수 합성 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InverseSynthesis {
    pub rules: Vec<InverseRule>,
    pub suggestions: Vec<SuggestedQuantity>,
    pub suggested_units: Vec<MeasurementUnit>,
}

impl InverseSynthesis {
    /// `right`의 역수 대상(첫 일치). 없으면 `None`.
    pub fn target_of(&self, right: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.right == right)
            .map(|r| r.result.as_str())
    }
}

/// 각 물리량의 역수 차원과 일치하는 첫 번째 물리량을 찾아 규칙을 만든다.
///
/// 일치하는 물리량이 없으면 이름/기호/차원식을 뒤집은 새 물리량과, 선형 측정 단위에
/// 대한 역수 단위를 제안한다.
///
/// 색인에 있는 이름이 카탈로그에 없으면 `UnknownQuantity`.
pub fn synthesize_inverses(
    catalog: &Catalog,
    index: &DimensionIndex,
    policy: &AmbiguityPolicy,
) -> Result<InverseSynthesis, RuleError> {
    let mut out = InverseSynthesis::default();
    for entry in catalog.entries() {
        let inverse = entry.dimension.invert();
        // 색인의 이름 순서는 정렬된 카탈로그 순서와 같으므로 첫 일치가 곧 카탈로그 스캔의 첫 일치다.
        let target = match index
            .names_for(&inverse)
            .and_then(|names| names.iter().find(|n| policy.allows_output(n)))
        {
            Some(name) => Some(
                catalog
                    .get(name)
                    .ok_or_else(|| RuleError::UnknownQuantity(name.clone()))?,
            ),
            None => None,
        };
        match target {
            Some(target) => {
                debug!(
                    quantity = %entry.quantity.name,
                    inverse = %target.quantity.name,
                    "inverse"
                );
                for representation in Representation::ALL {
                    out.rules.push(InverseRule {
                        right: entry.quantity.name.clone(),
                        right_symbol: entry.quantity.unit_symbol.clone(),
                        result: target.quantity.name.clone(),
                        result_symbol: target.quantity.unit_symbol.clone(),
                        representation,
                    });
                }
            }
            None => {
                info!(quantity = %entry.quantity.name, "no inverse quantity found");
                out.suggestions.push(suggest_inverse(entry));
                out.suggested_units.extend(
                    catalog
                        .units_of(&entry.quantity.name)
                        .filter_map(invert_measurement_unit),
                );
            }
        }
    }
    Ok(out)
}

/// 역수 물리량 정의를 제안한다.
pub fn suggest_inverse(entry: &CatalogEntry) -> SuggestedQuantity {
    let q = &entry.quantity;
    let symbol_human = q.unit_symbol_human.as_ref().map(|h| invert_dimension_text(h));
    SuggestedQuantity {
        source: q.name.clone(),
        quantity: Quantity {
            category: q.category.clone(),
            name: inverse_name(&q.name),
            dimension: invert_dimension_text(&q.dimension),
            unit_symbol: invert_unit_symbol(&q.unit_symbol),
            unit_name: invert_unit_name(&q.unit_name),
            desc_first_name: format!("inverse of {}", q.desc_first_name),
            desc_name: format!("inverse of {}", q.desc_name),
            unit_symbol_human: symbol_human,
        },
    }
}

/// 선형 측정 단위를 역수 물리량의 측정 단위로 뒤집는다. 오프셋이 있는(아핀) 행은 `None`.
pub fn invert_measurement_unit(unit: &MeasurementUnit) -> Option<MeasurementUnit> {
    if !unit.is_linear() {
        return None;
    }
    Some(MeasurementUnit {
        name: inverse_name(&unit.name),
        unit_name: invert_unit_name(&unit.unit_name),
        unit_symbol: invert_unit_symbol(&unit.unit_symbol),
        slope: unit.inverse_slope,
        offset: Some(0.0),
        inverse_slope: unit.slope,
    })
}

pub fn inverse_name(name: &str) -> String {
    format!("inverse {name}")
}

/// `"X per Y"`를 `"Y per X"`로, 구분자가 없으면 `"inverse "`를 앞에 붙인다.
pub fn invert_unit_name(unit_name: &str) -> String {
    match pivot_rotate(unit_name, " per ") {
        Some(rotated) => rotated,
        None => format!("inverse {unit_name}"),
    }
}

/// 두 번째 글자 이후의 첫 `p`를 기준으로 회전(`mps` → `spm`), 없으면 `per_`를 앞에 붙인다.
pub fn invert_unit_symbol(symbol: &str) -> String {
    let pivot = symbol
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == 'p')
        .map(|(i, _)| i);
    match pivot {
        Some(i) => format!("{}p{}", &symbol[i + 1..], &symbol[..i]),
        None => format!("per_{symbol}"),
    }
}

/// 차원식을 `/` 기준으로 회전한다.
///
/// 두 번째 이후의 `/`는 먼저 분모 쪽 곱셈으로 합친다(`mol/s/m^3` → `mol/s.m^3`).
/// `/`가 없으면 전체를 분자로 보고 `1/X`가 되며, 결과가 `X/1`이면 `X`로 줄인다.
pub fn invert_dimension_text(expr: &str) -> String {
    let expr = expr.trim();
    let folded = match expr.split_once('/') {
        Some((numer, denom)) => format!("{numer}/{}", denom.replace('/', ".")),
        None => format!("{expr}/1"),
    };
    let rotated = pivot_rotate(&folded, "/").unwrap_or(folded);
    match rotated.strip_suffix("/1") {
        Some(numerator) => numerator.to_string(),
        None => rotated,
    }
}

/// 첫 번째 `pivot` 앞뒤를 맞바꾼다. `pivot`이 없으면 `None`.
pub fn pivot_rotate(text: &str, pivot: &str) -> Option<String> {
    let (before, after) = text.split_once(pivot)?;
    Some(format!("{after}{pivot}{before}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_rotation_swaps_halves() {
        assert_eq!(pivot_rotate("meters per second", " per ").as_deref(), Some("second per meters"));
        assert_eq!(pivot_rotate("kg.m/s^2", "/").as_deref(), Some("s^2/kg.m"));
        assert_eq!(pivot_rotate("seconds", " per "), None);
    }

    #[test]
    fn unit_names_and_symbols() {
        assert_eq!(invert_unit_name("moles per second"), "second per moles");
        assert_eq!(invert_unit_name("seconds"), "inverse seconds");
        assert_eq!(invert_unit_symbol("mps"), "spm");
        assert_eq!(invert_unit_symbol("molpm3"), "m3pmol");
        // 첫 글자의 p는 기준이 아니다
        assert_eq!(invert_unit_symbol("pc"), "per_pc");
        assert_eq!(invert_unit_symbol("Gy"), "per_Gy");
    }

    #[test]
    fn dimension_text_rotation() {
        assert_eq!(invert_dimension_text("m/s"), "s/m");
        assert_eq!(invert_dimension_text("s"), "1/s");
        assert_eq!(invert_dimension_text("1/s"), "s");
        assert_eq!(invert_dimension_text("kg.m^2/s^2"), "s^2/kg.m^2");
        assert_eq!(invert_dimension_text("mol/s/m^3"), "s.m^3/mol");
        assert_eq!(invert_dimension_text("1/s/m"), "s.m");
    }

    #[test]
    fn affine_units_are_not_inverted() {
        let celsius = MeasurementUnit {
            name: "temperature".into(),
            unit_name: "celsius".into(),
            unit_symbol: "degC".into(),
            slope: 1.0,
            offset: Some(273.15),
            inverse_slope: 1.0,
        };
        assert!(invert_measurement_unit(&celsius).is_none());

        let minutes = MeasurementUnit {
            name: "time".into(),
            unit_name: "minutes".into(),
            unit_symbol: "min".into(),
            slope: 60.0,
            offset: None,
            inverse_slope: 1.0 / 60.0,
        };
        let per_minute = invert_measurement_unit(&minutes).expect("linear");
        assert_eq!(per_minute.name, "inverse time");
        assert_eq!(per_minute.unit_name, "inverse minutes");
        assert_eq!(per_minute.unit_symbol, "per_min");
        assert_eq!(per_minute.slope, 1.0 / 60.0);
        assert_eq!(per_minute.inverse_slope, 60.0);
        assert_eq!(per_minute.offset, Some(0.0));
    }
}
