use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::index::DimensionIndex;
use crate::quantity::{Catalog, CatalogError};
use crate::relation::{self, Evaluation, RelationError};
use crate::render::{self, GeneratedModule, RenderError};
use crate::report::{self, Diagnostics};
use crate::synth::{self, ConversionRule, InverseSynthesis, RuleError};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum AppError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// 설정 저장/로드 오류
    Config(ConfigError),
    /// 카탈로그 로드/검증 오류
    Catalog(CatalogError),
    /// 규칙 합성 오류
    Rule(RuleError),
    /// 관계식 평가 오류
    Relation(RelationError),
    /// 소스 생성 오류
    Render(RenderError),
    /// 제안 TOML 직렬화 오류
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io(e) => write!(f, "입출력 오류: {e}"),
            AppError::Config(e) => write!(f, "설정 오류: {e}"),
            AppError::Catalog(e) => write!(f, "카탈로그 오류: {e}"),
            AppError::Rule(e) => write!(f, "규칙 합성 오류: {e}"),
            AppError::Relation(e) => write!(f, "관계식 오류: {e}"),
            AppError::Render(e) => write!(f, "렌더링 오류: {e}"),
            AppError::Serialize(e) => write!(f, "직렬화 오류: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        AppError::Catalog(value)
    }
}

impl From<RuleError> for AppError {
    fn from(value: RuleError) -> Self {
        AppError::Rule(value)
    }
}

impl From<RelationError> for AppError {
    fn from(value: RelationError) -> Self {
        AppError::Relation(value)
    }
}

impl From<RenderError> for AppError {
    fn from(value: RenderError) -> Self {
        AppError::Render(value)
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(value: toml::ser::Error) -> Self {
        AppError::Serialize(value)
    }
}

/// 카탈로그 하나에 대한 전체 분석 결과.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub catalog: Catalog,
    pub index: DimensionIndex,
    pub conversions: Vec<ConversionRule>,
    pub inverses: InverseSynthesis,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// 색인을 만들고 두 합성기를 실행한다.
    pub fn run(catalog: Catalog, config: &Config) -> Result<Self, AppError> {
        let index = DimensionIndex::build(&catalog);
        let conversions = synth::synthesize_conversions(&catalog, &index, &config.policy)?;
        let inverses = synth::synthesize_inverses(&catalog, &index, &config.policy)?;
        let diagnostics = Diagnostics::collect(
            index.equivalence_groups(),
            &conversions,
            &inverses,
            catalog.measurement_units(),
        );
        info!(
            quantities = catalog.len(),
            dimensions = index.classes().len(),
            conversions = conversions.len(),
            inverse_rules = inverses.rules.len(),
            suggestions = inverses.suggestions.len(),
            "analysis complete"
        );
        Ok(Self {
            catalog,
            index,
            conversions,
            inverses,
            diagnostics,
        })
    }

    pub fn render(&self) -> Result<Vec<GeneratedModule>, RenderError> {
        render::render_modules(&self.catalog, &self.conversions, &self.inverses)
    }
}

/// 설정에 지정된 카탈로그를 읽어 분석한다.
pub fn analyze(config: &Config) -> Result<Analysis, AppError> {
    let catalog = Catalog::load(&config.catalog_path, &config.measurement_units_path)?;
    info!(path = %config.catalog_path.display(), quantities = catalog.len(), "catalog loaded");
    Analysis::run(catalog, config)
}

/// 생성된 모듈을 `output_dir/<category>.rs`로 쓴다. `dry_run`이면 경로만 돌려준다.
pub fn generate(config: &Config, output_dir: &Path, dry_run: bool) -> Result<Vec<PathBuf>, AppError> {
    let analysis = analyze(config)?;
    let modules = analysis.render()?;
    if !dry_run {
        fs::create_dir_all(output_dir)?;
    }
    let mut written = Vec::with_capacity(modules.len());
    for module in modules {
        let path = output_dir.join(&module.file_name);
        if !dry_run {
            fs::write(&path, &module.source)?;
        }
        info!(path = %path.display(), bytes = module.source.len(), dry_run, "module");
        written.push(path);
    }
    Ok(written)
}

/// 진단 보고서를 만들고, 경로가 주어지면 제안 TOML을 저장한다.
pub fn check(config: &Config, suggestions_path: Option<&Path>) -> Result<String, AppError> {
    let analysis = analyze(config)?;
    if let Some(path) = suggestions_path {
        fs::write(path, report::suggestions_toml(&analysis.diagnostics)?)?;
        info!(path = %path.display(), "suggestions written");
    }
    Ok(report::diagnostics_text(&analysis.diagnostics))
}

/// 관계식을 평가한다.
pub fn eval(config: &Config, expr: &str) -> Result<Evaluation, AppError> {
    let analysis = analyze(config)?;
    Ok(relation::evaluate(expr, &analysis.catalog, &analysis.index)?)
}
