//! 차원 대수와 관계 합성 엔진을 라이브러리로 분리하여 CLI 외의 생성 도구에서도 재사용할 수 있게 한다.

pub mod app;
pub mod config;
pub mod dimension;
pub mod index;
pub mod quantity;
pub mod relation;
pub mod render;
pub mod report;
pub mod synth;
