//! 정규 차원 → 물리량 이름 목록 색인.

use std::collections::HashMap;
use tracing::warn;

use crate::dimension::DimensionVector;
use crate::quantity::Catalog;

/// 같은 차원을 공유하는 물리량 묶음(발견 순서 유지).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionClass {
    pub dimension: DimensionVector,
    pub names: Vec<String>,
}

/// 차원만으로는 구별할 수 없는 물리량 묶음. 큐레이터에게 보고할 진단 정보.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalentQuantities {
    pub dimension: DimensionVector,
    pub names: Vec<String>,
}

/// 카탈로그를 한 번 훑어 만든 차원 색인.
///
/// `classes`의 순서와 각 `names`의 순서는 정렬된 카탈로그에서 처음 발견된 순서다.
#[derive(Debug, Clone, Default)]
pub struct DimensionIndex {
    classes: Vec<DimensionClass>,
    lookup: HashMap<DimensionVector, usize>,
}

impl DimensionIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Self::default();
        for entry in catalog.entries() {
            let name = entry.quantity.name.as_str();
            if name.is_empty() {
                continue;
            }
            match index.lookup.get(&entry.dimension) {
                Some(&slot) => index.classes[slot].names.push(name.to_string()),
                None => {
                    index
                        .lookup
                        .insert(entry.dimension.clone(), index.classes.len());
                    index.classes.push(DimensionClass {
                        dimension: entry.dimension.clone(),
                        names: vec![name.to_string()],
                    });
                }
            }
        }
        for group in index.equivalence_groups() {
            warn!(
                dimension = %group.dimension,
                quantities = %group.names.join(", "),
                "dimensionally equivalent quantities"
            );
        }
        index
    }

    /// 서로 다른 차원 목록(발견 순서).
    pub fn classes(&self) -> &[DimensionClass] {
        &self.classes
    }

    /// 해당 차원을 가진 물리량 이름들. 없으면 `None`.
    pub fn names_for(&self, dimension: &DimensionVector) -> Option<&[String]> {
        self.lookup
            .get(dimension)
            .map(|&slot| self.classes[slot].names.as_slice())
    }

    pub fn contains(&self, dimension: &DimensionVector) -> bool {
        self.lookup.contains_key(dimension)
    }

    pub fn equivalence_groups(&self) -> Vec<EquivalentQuantities> {
        self.classes
            .iter()
            .filter(|c| c.names.len() > 1)
            .map(|c| EquivalentQuantities {
                dimension: c.dimension.clone(),
                names: c.names.clone(),
            })
            .collect()
    }
}
