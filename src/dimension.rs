//! SI 차원식을 정규화된 분자/분모 토큰 다중집합으로 표현하고 곱셈/나눗셈/역수 연산을 제공한다.

use std::fmt;
use std::ops::{Div, Mul};

/// 차원식 처리 시 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    /// 차원식 또는 거듭제곱 표기를 해석할 수 없음
    Format {
        expression: String,
        reason: &'static str,
    },
    /// 차원이 없는 피연산자끼리 대수 연산을 시도함
    TypeMismatch { operation: &'static str },
}

impl fmt::Display for DimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionError::Format { expression, reason } => {
                write!(f, "차원식 형식 오류 '{expression}': {reason}")
            }
            DimensionError::TypeMismatch { operation } => {
                write!(f, "차원 연산 피연산자 불일치: {operation}")
            }
        }
    }
}

impl std::error::Error for DimensionError {}

fn format_error(expression: &str, reason: &'static str) -> DimensionError {
    DimensionError::Format {
        expression: expression.to_string(),
        reason,
    }
}

/// 물리 차원의 정규형.
///
/// 생성 경로(파싱, 곱, 몫, 역수)가 모두 정규화를 거치므로 분자와 분모에 같은 토큰이
/// 동시에 존재하지 않고 양쪽 모두 정렬되어 있다. 따라서 파생된 `PartialEq`/`Hash`는
/// 다중집합 동치와 일치한다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionVector {
    numerator: Vec<String>,
    denominator: Vec<String>,
}

impl DimensionVector {
    /// 분자/분모 토큰 목록으로부터 정규화된 차원을 만든다.
    pub fn new(numerator: Vec<String>, denominator: Vec<String>) -> Self {
        let mut dim = Self {
            numerator,
            denominator,
        };
        dim.canonicalize();
        dim
    }

    /// 무차원(분자/분모 모두 비어 있음).
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// `kg.m^2/s^2` 형태의 차원식을 해석한다.
    ///
    /// 첫 번째 `/` 이후의 모든 `/`는 분모 쪽 곱셈으로 합쳐진다. 한쪽 전체가 `1`이면
    /// 빈 쪽으로 취급한다(`1/s`).
    pub fn parse(expr: &str) -> Result<Self, DimensionError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(format_error(expr, "빈 차원식"));
        }
        let (numer, denom) = match trimmed.split_once('/') {
            Some((n, d)) => (n, Some(d.replace('/', "."))),
            None => (trimmed, None),
        };
        let numerator = expand_side(expr, numer)?;
        let denominator = match denom {
            Some(d) => expand_side(expr, &d)?,
            None => Vec::new(),
        };
        Ok(Self::new(numerator, denominator))
    }

    pub fn numerator(&self) -> &[String] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[String] {
        &self.denominator
    }

    pub fn is_dimensionless(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    /// 두 차원의 곱.
    pub fn multiply(&self, other: &Self) -> Self {
        let numerator = self
            .numerator
            .iter()
            .chain(&other.numerator)
            .cloned()
            .collect();
        let denominator = self
            .denominator
            .iter()
            .chain(&other.denominator)
            .cloned()
            .collect();
        Self::new(numerator, denominator)
    }

    /// 두 차원의 몫. `multiply(a, invert(b))`와 같다.
    pub fn divide(&self, other: &Self) -> Self {
        self.multiply(&other.invert())
    }

    /// 분자와 분모를 맞바꾼다.
    pub fn invert(&self) -> Self {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    /// 공통 토큰을 한 번에 하나씩 상쇄한 뒤 양쪽을 정렬한다.
    fn canonicalize(&mut self) {
        let mut denominator = std::mem::take(&mut self.denominator);
        let mut numerator = Vec::with_capacity(self.numerator.len());
        for token in self.numerator.drain(..) {
            match denominator.iter().position(|d| *d == token) {
                Some(pos) => {
                    denominator.remove(pos);
                }
                None => numerator.push(token),
            }
        }
        numerator.sort();
        denominator.sort();
        self.numerator = numerator;
        self.denominator = denominator;
    }
}

impl fmt::Display for DimensionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 분자가 비면 `1`로 표기해 다시 파싱 가능하게 유지한다.
        let numer = if self.numerator.is_empty() {
            "1".to_string()
        } else {
            condense(&self.numerator)
        };
        if self.denominator.is_empty() {
            write!(f, "{numer}")
        } else {
            write!(f, "{numer}/{}", condense(&self.denominator))
        }
    }
}

impl Mul for &DimensionVector {
    type Output = DimensionVector;

    fn mul(self, rhs: Self) -> DimensionVector {
        self.multiply(rhs)
    }
}

impl Div for &DimensionVector {
    type Output = DimensionVector;

    fn div(self, rhs: Self) -> DimensionVector {
        self.divide(rhs)
    }
}

/// `kg.m^3`을 `["kg", "m", "m", "m"]`로 펼친다. `1`은 빈 목록이다.
pub fn expand(side: &str) -> Result<Vec<String>, DimensionError> {
    expand_side(side, side)
}

fn expand_side(expr: &str, side: &str) -> Result<Vec<String>, DimensionError> {
    let side = side.trim();
    if side.is_empty() {
        return Err(format_error(expr, "분자 또는 분모가 비어 있음"));
    }
    if side == "1" {
        return Ok(Vec::new());
    }
    let mut tokens = Vec::new();
    for raw in side.split('.') {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(format_error(expr, "빈 단위 토큰"));
        }
        let (base, count) = match raw.split_once('^') {
            Some((base, power)) => (base.trim(), parse_power(expr, power)?),
            None => (raw, 1),
        };
        if base.is_empty() {
            return Err(format_error(expr, "거듭제곱 앞에 단위 토큰이 없음"));
        }
        // 곱셈 항등원
        if base == "1" {
            continue;
        }
        if base.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format_error(expr, "숫자로 시작하는 단위 토큰"));
        }
        tokens.extend(std::iter::repeat(base.to_string()).take(count));
    }
    Ok(tokens)
}

fn parse_power(expr: &str, power: &str) -> Result<usize, DimensionError> {
    match power.trim().parse::<usize>() {
        Ok(0) => Err(format_error(expr, "거듭제곱은 1 이상이어야 함")),
        Ok(n) => Ok(n),
        Err(_) => Err(format_error(expr, "거듭제곱은 양의 정수여야 함")),
    }
}

/// 반복 토큰을 `tok^n` 표기로 압축한다. 토큰 순서는 처음 등장한 순서를 따른다.
pub fn condense(tokens: &[String]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for token in tokens {
        if seen.contains(&token.as_str()) {
            continue;
        }
        seen.push(token);
        let count = tokens.iter().filter(|t| *t == token).count();
        if count > 1 {
            parts.push(format!("{token}^{count}"));
        } else {
            parts.push(token.clone());
        }
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(expr: &str) -> DimensionVector {
        DimensionVector::parse(expr).expect("valid dimension")
    }

    #[test]
    fn parse_expands_powers_and_sorts() {
        let d = dim("m^2.kg/s^2");
        assert_eq!(d.numerator(), ["kg", "m", "m"]);
        assert_eq!(d.denominator(), ["s", "s"]);
    }

    #[test]
    fn parse_folds_extra_slashes_into_denominator() {
        assert_eq!(dim("mol/s/m^3"), dim("mol/m^3.s"));
    }

    #[test]
    fn parse_cancels_shared_tokens() {
        let d = dim("kg.m.s/s^3");
        assert_eq!(d.to_string(), "kg.m/s^2");
    }

    #[test]
    fn reciprocal_side_is_empty() {
        let hz = dim("1/s");
        assert!(hz.numerator().is_empty());
        assert_eq!(hz.denominator(), ["s"]);
        assert_eq!(hz.to_string(), "1/s");
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for bad in ["", "kg..m", "kg/", "/s", "m^0", "m^-2", "m^1.5", "m^x", "^2"] {
            let err = DimensionVector::parse(bad).expect_err(bad);
            assert!(matches!(err, DimensionError::Format { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn render_uses_power_notation() {
        assert_eq!(dim("kg.kg.kg").to_string(), "kg^3");
        assert_eq!(dim("1").to_string(), "1");
        assert_eq!(dim("m/m").to_string(), "1");
    }

    #[test]
    fn operators_match_methods() {
        let a = dim("kg");
        let b = dim("m/s^2");
        assert_eq!(&a * &b, a.multiply(&b));
        assert_eq!(&a / &b, a.divide(&b));
    }

    #[test]
    fn condense_keeps_first_occurrence_order() {
        let tokens: Vec<String> = ["s", "kg", "s"].iter().map(|t| t.to_string()).collect();
        assert_eq!(condense(&tokens), "s^2.kg");
    }
}
