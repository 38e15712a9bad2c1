//! `energy / time`, `1 / frequency` 같은 관계식을 카탈로그 기준으로 평가한다.

use std::fmt;

use crate::dimension::{DimensionError, DimensionVector};
use crate::index::DimensionIndex;
use crate::quantity::Catalog;
use crate::synth::{Operator, RuleError};

/// 관계식 평가 시 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    /// 피연산자가 비어 있는 등 식의 형태가 잘못됨
    Syntax(&'static str),
    Rule(RuleError),
    Dimension(DimensionError),
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationError::Syntax(msg) => write!(f, "관계식 구문 오류: {msg}"),
            RelationError::Rule(e) => write!(f, "{e}"),
            RelationError::Dimension(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RelationError {}

impl From<RuleError> for RelationError {
    fn from(value: RuleError) -> Self {
        RelationError::Rule(value)
    }
}

impl From<DimensionError> for RelationError {
    fn from(value: DimensionError) -> Self {
        RelationError::Dimension(value)
    }
}

/// 관계식의 피연산자. 물리량은 차원을, 숫자 리터럴은 스칼라를 가진다.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Dimension(DimensionVector),
    Scalar(f64),
}

impl Operand {
    /// 물리량끼리의 곱/몫만 허용한다. 유일한 예외는 `1 / Q`(역수)이며, 그 밖에
    /// 스칼라가 섞인 연산은 모두 `TypeMismatch`다.
    pub fn apply(self, operator: Operator, rhs: Operand) -> Result<Operand, DimensionError> {
        match (self, operator, rhs) {
            (Operand::Dimension(a), Operator::Multiply, Operand::Dimension(b)) => {
                Ok(Operand::Dimension(&a * &b))
            }
            (Operand::Dimension(a), Operator::Divide, Operand::Dimension(b)) => {
                Ok(Operand::Dimension(&a / &b))
            }
            (Operand::Scalar(value), Operator::Divide, Operand::Dimension(b)) if value == 1.0 => {
                Ok(Operand::Dimension(b.invert()))
            }
            (Operand::Dimension(_), _, Operand::Scalar(_)) => Err(DimensionError::TypeMismatch {
                operation: "물리량과 스칼라의 연산",
            }),
            (Operand::Scalar(_), _, Operand::Dimension(_)) => Err(DimensionError::TypeMismatch {
                operation: "스칼라와 물리량의 연산(역수는 1 / 물리량만 허용)",
            }),
            (Operand::Scalar(_), _, Operand::Scalar(_)) => Err(DimensionError::TypeMismatch {
                operation: "스칼라끼리의 연산에는 차원이 없음",
            }),
        }
    }
}

/// 관계식 평가 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub dimension: DimensionVector,
    /// 결과 차원을 가진 물리량(색인 순서)
    pub matches: Vec<String>,
}

/// 왼쪽 결합으로 관계식을 평가한다.
pub fn evaluate(
    expr: &str,
    catalog: &Catalog,
    index: &DimensionIndex,
) -> Result<Evaluation, RelationError> {
    let (operands, operators) = split_expression(expr)?;
    let mut terms = operands.into_iter().map(|text| resolve(text, catalog));
    let mut acc = match terms.next() {
        Some(first) => first?,
        None => return Err(RelationError::Syntax("빈 관계식")),
    };
    for (operator, term) in operators.into_iter().zip(terms) {
        acc = acc.apply(operator, term?)?;
    }
    match acc {
        Operand::Dimension(dimension) => {
            let matches = index
                .names_for(&dimension)
                .map(|names| names.to_vec())
                .unwrap_or_default();
            Ok(Evaluation { dimension, matches })
        }
        Operand::Scalar(_) => Err(DimensionError::TypeMismatch {
            operation: "관계식에 물리량이 없음",
        }
        .into()),
    }
}

fn split_expression(expr: &str) -> Result<(Vec<&str>, Vec<Operator>), RelationError> {
    let mut operands = Vec::new();
    let mut operators = Vec::new();
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        let operator = match c {
            '*' | '×' => Operator::Multiply,
            '/' | '÷' => Operator::Divide,
            '+' | '-' | '^' | '%' => {
                return Err(RuleError::UnsupportedOperator(c.to_string()).into())
            }
            _ => continue,
        };
        operands.push(expr[start..i].trim());
        operators.push(operator);
        start = i + c.len_utf8();
    }
    operands.push(expr[start..].trim());
    if operands.iter().any(|o| o.is_empty()) {
        return Err(RelationError::Syntax("연산자 양쪽에 피연산자가 필요함"));
    }
    Ok((operands, operators))
}

fn resolve(text: &str, catalog: &Catalog) -> Result<Operand, RelationError> {
    if let Ok(value) = text.parse::<f64>() {
        return Ok(Operand::Scalar(value));
    }
    catalog
        .get(text)
        .map(|entry| Operand::Dimension(entry.dimension.clone()))
        .ok_or_else(|| RuleError::UnknownQuantity(text.to_string()).into())
}
