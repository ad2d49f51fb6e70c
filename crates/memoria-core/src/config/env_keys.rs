//! 环境变量 key 常量与别名定义
//!
//! 主变量使用 `MEMORIA_*`，兼容早期脚本使用的 `MEMORY_*`。

/// 沙箱根目录
pub mod paths {
    /// Base directory holding `memories/` and `transcripts/`.
    pub const MEMORIA_BASE_PATH: &str = "MEMORIA_BASE_PATH";
    pub const BASE_PATH_ALIASES: &[&str] = &["MEMORY_BASE_PATH"];
}

/// 可观测性与日志
pub mod observability {
    pub const MEMORIA_QUIET: &str = "MEMORIA_QUIET";

    pub const MEMORIA_LOG_LEVEL: &str = "MEMORIA_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["RUST_LOG_MEMORIA"];

    pub const MEMORIA_LOG_JSON: &str = "MEMORIA_LOG_JSON";

    pub const MEMORIA_AUDIT_LOG: &str = "MEMORIA_AUDIT_LOG";
}
