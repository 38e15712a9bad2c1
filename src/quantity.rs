//! 물리량 카탈로그와 측정 단위 테이블.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::dimension::{DimensionError, DimensionVector};

/// 카탈로그의 물리량 한 행.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// 출력 모듈 분류(base, mechanical 등)
    pub category: String,
    /// 카탈로그 전체에서 유일한 이름
    pub name: String,
    /// SI 차원식(예: `kg.m^2/s^2`)
    pub dimension: String,
    /// 코드 필드명으로 쓰이는 단위 기호(예: `mps`)
    pub unit_symbol: String,
    pub unit_name: String,
    pub desc_first_name: String,
    pub desc_name: String,
    /// 사람이 읽는 단위 기호(예: `m/s`). 없으면 `unit_symbol`을 쓴다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_symbol_human: Option<String>,
}

impl Quantity {
    pub fn human_symbol(&self) -> &str {
        self.unit_symbol_human
            .as_deref()
            .unwrap_or(&self.unit_symbol)
    }
}

/// 물리량의 대체 단위 환산 계수.
///
/// 저장값 기준: `from = value * slope + offset`, `to = (stored - offset) * inverse_slope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementUnit {
    /// 대상 물리량 이름
    pub name: String,
    pub unit_name: String,
    pub unit_symbol: String,
    pub slope: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    pub inverse_slope: f64,
}

const COEFFICIENT_TOLERANCE: f64 = 1e-9;

impl MeasurementUnit {
    /// 오프셋이 없거나 0이거나 유한하지 않으면 순수 배율 환산으로 본다.
    pub fn is_linear(&self) -> bool {
        match self.offset {
            None => true,
            Some(o) => o == 0.0 || !o.is_finite(),
        }
    }

    /// 배율 1, 오프셋 없음: 기준 단위의 별칭.
    pub fn is_identity(&self) -> bool {
        self.is_linear() && self.slope == 1.0
    }

    /// `slope * inverse_slope`가 1에 충분히 가까운지 확인한다.
    pub fn is_consistent(&self) -> bool {
        let product = self.slope * self.inverse_slope;
        product.is_finite() && (product - 1.0).abs() <= COEFFICIENT_TOLERANCE * product.abs().max(1.0)
    }

    /// 계산에 쓰이는 오프셋. 비선형 판정과 같은 기준으로 0을 돌려준다.
    pub fn effective_offset(&self) -> f64 {
        if self.is_linear() {
            0.0
        } else {
            self.offset.unwrap_or(0.0)
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct QuantityFile {
    #[serde(default)]
    quantity: Vec<Quantity>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct MeasurementUnitFile {
    #[serde(default)]
    unit: Vec<MeasurementUnit>,
}

/// 카탈로그 로드/검증 시 발생 가능한 오류.
#[derive(Debug)]
pub enum CatalogError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// TOML 파싱 오류
    Parse(toml::de::Error),
    /// 같은 이름의 물리량이 두 번 정의됨
    DuplicateQuantity(String),
    /// 측정 단위 행이 존재하지 않는 물리량을 가리킴
    UnknownQuantity { unit: String, quantity: String },
    /// 물리량의 차원식을 해석할 수 없음
    Dimension {
        quantity: String,
        source: DimensionError,
    },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "카탈로그 입출력 오류: {e}"),
            CatalogError::Parse(e) => write!(f, "카탈로그 파싱 오류: {e}"),
            CatalogError::DuplicateQuantity(name) => write!(f, "중복된 물리량 이름: {name}"),
            CatalogError::UnknownQuantity { unit, quantity } => {
                write!(f, "측정 단위 '{unit}'의 물리량 '{quantity}'을(를) 찾을 수 없음")
            }
            CatalogError::Dimension { quantity, source } => {
                write!(f, "물리량 '{quantity}': {source}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        CatalogError::Io(value)
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(value: toml::de::Error) -> Self {
        CatalogError::Parse(value)
    }
}

/// 차원이 해석된 카탈로그 항목.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub quantity: Quantity,
    pub dimension: DimensionVector,
}

/// 분류-이름 순으로 정렬된 불변 카탈로그.
///
/// 합성 단계의 "첫 일치" 규칙은 이 순서에 의존한다.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    measurement_units: Vec<MeasurementUnit>,
}

impl Catalog {
    /// 이름 앞뒤 공백을 정리하고, 이름 중복과 차원식을 검증한 뒤 분류-이름 순으로 정렬한다.
    ///
    /// 정리된 이름이 색인, 규칙, 조회 모두에서 쓰이는 유일한 키다.
    pub fn new(
        quantities: Vec<Quantity>,
        mut measurement_units: Vec<MeasurementUnit>,
    ) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        let mut entries = Vec::with_capacity(quantities.len());
        for mut quantity in quantities {
            quantity.name = quantity.name.trim().to_string();
            if !names.insert(quantity.name.clone()) {
                return Err(CatalogError::DuplicateQuantity(quantity.name));
            }
            let dimension = DimensionVector::parse(&quantity.dimension).map_err(|source| {
                CatalogError::Dimension {
                    quantity: quantity.name.clone(),
                    source,
                }
            })?;
            entries.push(CatalogEntry {
                quantity,
                dimension,
            });
        }
        entries.sort_by(|a, b| {
            (&a.quantity.category, &a.quantity.name).cmp(&(&b.quantity.category, &b.quantity.name))
        });
        for unit in &mut measurement_units {
            unit.name = unit.name.trim().to_string();
            if !names.contains(&unit.name) {
                return Err(CatalogError::UnknownQuantity {
                    unit: unit.unit_name.clone(),
                    quantity: unit.name.clone(),
                });
            }
        }
        Ok(Self {
            entries,
            measurement_units,
        })
    }

    /// 물리량/측정 단위 TOML 문자열로부터 카탈로그를 만든다.
    pub fn from_toml(quantities: &str, measurement_units: &str) -> Result<Self, CatalogError> {
        let q: QuantityFile = toml::from_str(quantities)?;
        let u: MeasurementUnitFile = toml::from_str(measurement_units)?;
        Self::new(q.quantity, u.unit)
    }

    /// 파일에서 카탈로그를 읽는다. 측정 단위 파일이 없으면 빈 테이블로 취급한다.
    pub fn load(quantities_path: &Path, measurement_units_path: &Path) -> Result<Self, CatalogError> {
        let quantities = fs::read_to_string(quantities_path)?;
        let units = if measurement_units_path.exists() {
            fs::read_to_string(measurement_units_path)?
        } else {
            String::new()
        };
        Self::from_toml(&quantities, &units)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.quantity.name == name)
    }

    pub fn measurement_units(&self) -> &[MeasurementUnit] {
        &self.measurement_units
    }

    /// 주어진 물리량에 딸린 측정 단위 행(입력 순서 유지).
    pub fn units_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MeasurementUnit> + 'a {
        self.measurement_units.iter().filter(move |u| u.name == name)
    }

    /// 분류 이름 목록(정렬, 중복 제거).
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.quantity.category.as_str())
            .collect();
        categories.dedup();
        categories
    }
}

/// 측정 단위 목록을 입력 파일과 같은 `[[unit]]` 스키마로 직렬화한다.
pub fn measurement_units_to_toml(units: &[MeasurementUnit]) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&MeasurementUnitFile {
        unit: units.to_vec(),
    })
}

/// 물리량 목록을 입력 파일과 같은 `[[quantity]]` 스키마로 직렬화한다.
pub fn quantities_to_toml(quantities: &[Quantity]) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&QuantityFile {
        quantity: quantities.to_vec(),
    })
}
