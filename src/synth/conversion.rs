use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::AmbiguityPolicy;
use crate::index::DimensionIndex;
use crate::quantity::Catalog;

/// 규칙 생성/해석 시 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// `*`, `/`(또는 `×`, `÷`) 이외의 연산자
    UnsupportedOperator(String),
    /// 카탈로그에 없는 물리량
    UnknownQuantity(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::UnsupportedOperator(op) => write!(f, "지원하지 않는 연산자: {op}"),
            RuleError::UnknownQuantity(name) => write!(f, "알 수 없는 물리량: {name}"),
        }
    }
}

impl std::error::Error for RuleError {}

/// 변환 규칙의 연산자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Multiply,
    Divide,
}

impl Operator {
    /// 생성 코드에 쓰이는 연산 기호.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    pub fn verbing(self) -> &'static str {
        match self {
            Operator::Multiply => "multiplying",
            Operator::Divide => "dividing",
        }
    }

    /// `core::ops` 트레이트 메서드 이름(`mul`, `div`).
    pub fn function_name(self) -> &'static str {
        match self {
            Operator::Multiply => "mul",
            Operator::Divide => "div",
        }
    }

    /// `core::ops` 트레이트 이름(`Mul`, `Div`).
    pub fn trait_name(self) -> &'static str {
        match self {
            Operator::Multiply => "Mul",
            Operator::Divide => "Div",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" | "×" => Ok(Operator::Multiply),
            "/" | "÷" => Ok(Operator::Divide),
            other => Err(RuleError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// `left ⊗ right = result` 형태의 변환 규칙.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRule {
    pub left: String,
    pub left_symbol: String,
    pub operator: Operator,
    pub right: String,
    pub right_symbol: String,
    pub result: String,
    pub result_symbol: String,
}

impl ConversionRule {
    pub fn verbing(&self) -> &'static str {
        self.operator.verbing()
    }
}

impl fmt::Display for ConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {} ({}) -> {} ({})",
            self.left,
            self.left_symbol,
            self.operator,
            self.right,
            self.right_symbol,
            self.result,
            self.result_symbol
        )
    }
}

/// 모든 물리량과 모든 차원 클래스의 곱/몫을 계산해 카탈로그에 존재하는 결과만 규칙으로 만든다.
///
/// 바깥 루프는 정렬된 카탈로그, 안쪽 루프는 색인의 차원 클래스 순서이며, 한 클래스에
/// 대해 곱을 먼저, 몫을 나중에 내보낸다. 같은 입력이면 항상 같은 순서가 나온다.
///
/// 색인에 있는 이름이 카탈로그에 없으면(다른 카탈로그로 만든 색인) `UnknownQuantity`.
pub fn synthesize_conversions(
    catalog: &Catalog,
    index: &DimensionIndex,
    policy: &AmbiguityPolicy,
) -> Result<Vec<ConversionRule>, RuleError> {
    let mut rules = Vec::new();
    for entry in catalog.entries() {
        let left = &entry.quantity;
        for class in index.classes() {
            for operator in [Operator::Multiply, Operator::Divide] {
                let combined = match operator {
                    Operator::Multiply => &entry.dimension * &class.dimension,
                    Operator::Divide => &entry.dimension / &class.dimension,
                };
                let Some(results) = index.names_for(&combined) else {
                    continue;
                };
                for right_name in &class.names {
                    for result_name in results {
                        if policy.is_disallowed(&left.name, right_name, result_name) {
                            continue;
                        }
                        let rule = ConversionRule {
                            left: left.name.clone(),
                            left_symbol: left.unit_symbol.clone(),
                            operator,
                            right: right_name.clone(),
                            right_symbol: symbol_of(catalog, right_name)?,
                            result: result_name.clone(),
                            result_symbol: symbol_of(catalog, result_name)?,
                        };
                        debug!(%rule, "conversion");
                        rules.push(rule);
                    }
                }
            }
        }
    }
    Ok(rules)
}

fn symbol_of(catalog: &Catalog, name: &str) -> Result<String, RuleError> {
    catalog
        .get(name)
        .map(|e| e.quantity.unit_symbol.clone())
        .ok_or_else(|| RuleError::UnknownQuantity(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_text() {
        assert_eq!("×".parse::<Operator>(), Ok(Operator::Multiply));
        assert_eq!(" / ".parse::<Operator>(), Ok(Operator::Divide));
        assert_eq!(
            "+".parse::<Operator>(),
            Err(RuleError::UnsupportedOperator("+".to_string()))
        );
        assert_eq!(Operator::Divide.to_string(), "/");
    }
}
