//! 按领域分组的配置结构体
//!
//! 从环境变量加载，统一 fallback 逻辑。

use super::env_keys::{observability as obv_keys, paths};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Default base directory when nothing is configured.
pub const DEFAULT_BASE_PATH: &str = "./memory";

/// 沙箱根目录配置
#[derive(Debug, Clone)]
pub struct PathsConfig {
    /// Holds `memories/` (writable) and `transcripts/` (read-only).
    pub base_path: PathBuf,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let base_path = env_or(paths::MEMORIA_BASE_PATH, paths::BASE_PATH_ALIASES, || {
            DEFAULT_BASE_PATH.to_string()
        });
        Self {
            base_path: PathBuf::from(base_path),
        }
    }

    /// CLI `--base` wins over the environment.
    pub fn with_override(mut self, base: Option<PathBuf>) -> Self {
        if let Some(base) = base {
            self.base_path = base;
        }
        self
    }
}

/// 可观测性配置：quiet、log_level、log_json、audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::MEMORIA_QUIET, &[], false),
                log_level: env_or(
                    obv_keys::MEMORIA_LOG_LEVEL,
                    obv_keys::LOG_LEVEL_ALIASES,
                    || "memoria=info".to_string(),
                ),
                log_json: env_bool(obv_keys::MEMORIA_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::MEMORIA_AUDIT_LOG, &[]),
            }
        })
    }
}
