use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 블랙리스트를 무시하고 허용할 `(left, right, result)` 조합.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Combination {
    pub left: String,
    pub right: String,
    pub result: String,
}

impl Combination {
    pub fn new(left: &str, right: &str, result: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            result: result.to_string(),
        }
    }
}

/// 차원상으로는 맞지만 의미가 모호한 관계를 걸러내는 정책.
///
/// 차원 계산에는 관여하지 않고 합성 결과만 거른다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityPolicy {
    /// 곱/몫의 피연산자로 쓸 수 없는 물리량
    pub input_blacklist: BTreeSet<String>,
    /// 곱/몫의 결과나 역수 대상이 될 수 없는 물리량
    pub output_blacklist: BTreeSet<String>,
    /// 두 블랙리스트보다 우선하는 명시적 허용 조합
    pub whitelist: BTreeSet<Combination>,
}

impl AmbiguityPolicy {
    /// 아무것도 거르지 않는 정책.
    pub fn permissive() -> Self {
        Self {
            input_blacklist: BTreeSet::new(),
            output_blacklist: BTreeSet::new(),
            whitelist: BTreeSet::new(),
        }
    }

    pub fn is_whitelisted(&self, left: &str, right: &str, result: &str) -> bool {
        self.whitelist.iter().any(|c| c.left == left && c.right == right && c.result == result)
    }

    /// 화이트리스트에 없고, 피연산자 중 하나가 입력 블랙리스트이거나 결과가 출력
    /// 블랙리스트이면 금지한다.
    pub fn is_disallowed(&self, left: &str, right: &str, result: &str) -> bool {
        !self.is_whitelisted(left, right, result)
            && (self.input_blacklist.contains(left)
                || self.input_blacklist.contains(right)
                || self.output_blacklist.contains(result))
    }

    pub fn allows_output(&self, name: &str) -> bool {
        !self.output_blacklist.contains(name)
    }
}

impl Default for AmbiguityPolicy {
    fn default() -> Self {
        let names = |list: &[&str]| -> BTreeSet<String> { list.iter().map(|s| s.to_string()).collect() };
        let whitelist = [
            ("mass", "absorbed dose", "energy"),
            ("absorbed dose", "mass", "energy"),
            ("energy", "absorbed dose", "mass"),
            ("absorbed dose", "energy", "mass"),
            ("mass", "dose equivalent", "energy"),
            ("dose equivalent", "mass", "energy"),
            ("energy", "dose equivalent", "mass"),
            ("dose equivalent", "energy", "mass"),
            ("moment of inertia", "angular acceleration", "torque"),
            ("angular acceleration", "moment of inertia", "torque"),
            ("angular acceleration", "torque", "moment of inertia"),
            ("torque", "angular acceleration", "moment of inertia"),
            ("torque", "moment of inertia", "angular acceleration"),
        ]
        .iter()
        .map(|(l, r, o)| Combination::new(l, r, o))
        .collect();
        Self {
            input_blacklist: names(&["radioactivity", "absorbed dose", "dose equivalent"]),
            // 더 흔히 쓰이는 물리량과 차원이 같은 것들
            output_blacklist: names(&[
                "torque",
                "moment of inertia",
                "radioactivity",
                "absorbed dose",
                "dose equivalent",
            ]),
            whitelist,
        }
    }
}

/// 코드 생성기 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 물리량 정의 TOML 경로
    pub catalog_path: PathBuf,
    /// 측정 단위 환산 계수 TOML 경로
    pub measurement_units_path: PathBuf,
    /// 생성된 `<category>.rs` 파일을 쓸 디렉터리
    pub output_dir: PathBuf,
    pub policy: AmbiguityPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/quantities.toml"),
            measurement_units_path: PathBuf::from("data/measurement-units.toml"),
            output_dir: PathBuf::from("generated"),
            policy: AmbiguityPolicy::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum ConfigError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// TOML 역직렬화 오류
    Serde(toml::de::Error),
    /// TOML 직렬화 오류
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "파일 입출력 오류: {e}"),
            ConfigError::Serde(e) => write!(f, "설정 파싱 오류: {e}"),
            ConfigError::Serialize(e) => write!(f, "설정 직렬화 오류: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Serde(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        ConfigError::Serialize(value)
    }
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성해 저장한다.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        Ok(cfg)
    } else {
        let cfg = Config::default();
        cfg.save(path)?;
        Ok(cfg)
    }
}

impl Config {
    /// 설정을 TOML로 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_overrides_blacklists() {
        let policy = AmbiguityPolicy::default();
        assert!(policy.is_disallowed("absorbed dose", "time", "power"));
        assert!(!policy.is_disallowed("mass", "absorbed dose", "energy"));
        assert!(policy.is_disallowed("force", "distance", "torque"));
        assert!(!policy.is_disallowed("force", "distance", "energy"));
        assert!(!policy.allows_output("torque"));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        assert!(text.contains("[[policy.whitelist]]"));
        let back: Config = toml::from_str(&text).expect("deserialize");
        assert_eq!(back, cfg);
    }
}
