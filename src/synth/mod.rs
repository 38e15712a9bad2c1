//! 카탈로그 전체에서 곱/몫 관계와 역수 관계를 찾아내는 합성 모듈 모음.

pub mod conversion;
pub mod inverse;

pub use conversion::*;
pub use inverse::*;
