//! 큐레이터용 진단 보고서.

use std::fmt;
use tracing::warn;

use crate::index::EquivalentQuantities;
use crate::quantity::{self, MeasurementUnit, Quantity};
use crate::synth::{ConversionRule, InverseSynthesis, Representation};

/// 한 번의 분석 실행에서 나온 진단 정보 묶음.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub equivalent_groups: Vec<EquivalentQuantities>,
    /// `(quantity, inverse)` 쌍(카탈로그 순서)
    pub reciprocal_pairs: Vec<(String, String)>,
    pub suggestions: Vec<Quantity>,
    pub suggested_units: Vec<MeasurementUnit>,
    /// `slope * inverse_slope`가 1이 아닌 측정 단위
    pub inconsistent_units: Vec<MeasurementUnit>,
    pub conversion_count: usize,
}

impl Diagnostics {
    pub fn collect(
        equivalent_groups: Vec<EquivalentQuantities>,
        conversions: &[ConversionRule],
        inverses: &InverseSynthesis,
        measurement_units: &[MeasurementUnit],
    ) -> Self {
        let reciprocal_pairs = inverses
            .rules
            .iter()
            .filter(|r| r.representation == Representation::ALL[0])
            .map(|r| (r.right.clone(), r.result.clone()))
            .collect();
        let inconsistent_units: Vec<MeasurementUnit> = measurement_units
            .iter()
            .filter(|u| !u.is_consistent())
            .cloned()
            .collect();
        for unit in &inconsistent_units {
            warn!(
                quantity = %unit.name,
                unit = %unit.unit_symbol,
                slope = unit.slope,
                inverse_slope = unit.inverse_slope,
                "slope * inverse_slope != 1"
            );
        }
        Self {
            equivalent_groups,
            reciprocal_pairs,
            suggestions: inverses
                .suggestions
                .iter()
                .map(|s| s.quantity.clone())
                .collect(),
            suggested_units: inverses.suggested_units.clone(),
            inconsistent_units,
            conversion_count: conversions.len(),
        }
    }
}

/// 사람이 읽는 진단 텍스트.
pub fn diagnostics_text(diag: &Diagnostics) -> String {
    diag.to_string()
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "conversion rules: {}", self.conversion_count)?;
        if !self.equivalent_groups.is_empty() {
            writeln!(f, "\ndimensionally equivalent quantities:")?;
            for group in &self.equivalent_groups {
                writeln!(f, "  {}: {}", group.dimension, group.names.join(", "))?;
            }
        }
        if !self.reciprocal_pairs.is_empty() {
            writeln!(f, "\ninverse quantities:")?;
            for (quantity, inverse) in &self.reciprocal_pairs {
                writeln!(f, "  1/{quantity} = {inverse}")?;
            }
        }
        if !self.suggestions.is_empty() {
            writeln!(f, "\nsuggested inverse quantities:")?;
            for q in &self.suggestions {
                writeln!(
                    f,
                    "  {}\t{}\t{} [{}] ({})",
                    q.category, q.name, q.unit_name, q.unit_symbol, q.dimension
                )?;
            }
        }
        if !self.suggested_units.is_empty() {
            writeln!(f, "\nsuggested inverse measurement units:")?;
            for u in &self.suggested_units {
                writeln!(
                    f,
                    "  {}\t{} [{}]\tslope={:?} inverse_slope={:?}",
                    u.name, u.unit_name, u.unit_symbol, u.slope, u.inverse_slope
                )?;
            }
        }
        if !self.inconsistent_units.is_empty() {
            writeln!(f, "\ninconsistent measurement unit coefficients:")?;
            for u in &self.inconsistent_units {
                writeln!(
                    f,
                    "  {} [{}]: slope {:?} * inverse_slope {:?} != 1",
                    u.name, u.unit_symbol, u.slope, u.inverse_slope
                )?;
            }
        }
        Ok(())
    }
}

/// 제안된 물리량과 측정 단위를 입력 카탈로그와 같은 TOML 스키마로 직렬화한다.
pub fn suggestions_toml(diag: &Diagnostics) -> Result<String, toml::ser::Error> {
    let mut text = quantity::quantities_to_toml(&diag.suggestions)?;
    if !diag.suggested_units.is_empty() {
        text.push('\n');
        text.push_str(&quantity::measurement_units_to_toml(&diag.suggested_units)?);
    }
    Ok(text)
}
