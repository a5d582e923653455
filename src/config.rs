use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::parenteral::PatientInputs;
use crate::solution_db::SolutionSelection;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 표시 언어 코드 (auto/ko/en)
    pub language: String,
    /// tracing 필터 문자열 (예: "warn", "pn_toolbox=debug")
    pub log_level: String,
    /// 기본으로 체크된 포도당 원액
    pub enabled_solutions: SolutionSelection,
    /// 입력 폼 기본값
    pub defaults: PatientInputs,
    #[serde(skip)]
    path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            log_level: "warn".to_string(),
            enabled_solutions: SolutionSelection::all(),
            defaults: PatientInputs::clinical_defaults(),
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let mut cfg: Config = toml::from_str(&content)?;
        cfg.path = path.to_path_buf();
        Ok(cfg)
    } else {
        let cfg = Config {
            path: path.to_path_buf(),
            ..Config::default()
        };
        cfg.save()?;
        Ok(cfg)
    }
}

impl Config {
    /// 설정을 로드한 경로에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
