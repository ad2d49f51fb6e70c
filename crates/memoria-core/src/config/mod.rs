//! Memoria 统一配置层
//!
//! 所有环境变量读取集中在此模块，业务代码通过结构化配置访问，避免直接 `std::env::var`。
//!
//! - `loader`：env_or、env_optional、env_bool、load_dotenv
//! - `schema`：PathsConfig、ObservabilityConfig
//! - `env_keys`：key 常量（含别名）

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv};
pub use schema::{ObservabilityConfig, PathsConfig};
