/// 服务配置 — 环境变量覆盖，未设置时使用默认值
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | CATALOG_DB_PATH | catalog.db | SQLite 数据库路径 |
/// | POS_BASE_URL | http://localhost:4000 | POS catalog 服务地址 |
/// | POS_ACCESS_TOKEN | (empty) | POS API 访问令牌 |
/// | POS_TIMEOUT_MS | 30000 | POS 请求超时(毫秒) |
/// | LOG_DIR | (unset) | 日志目录，未设置时仅输出到 stdout |
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path
    pub db_path: String,
    /// POS mirror connection settings
    pub pos: PosConfig,
    /// Optional log directory for daily-rolling files
    pub log_dir: Option<String>,
}

/// POS catalog service connection settings
#[derive(Debug, Clone)]
pub struct PosConfig {
    pub base_url: String,
    pub access_token: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("CATALOG_DB_PATH").unwrap_or_else(|_| "catalog.db".into()),
            pos: PosConfig {
                base_url: std::env::var("POS_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:4000".into()),
                access_token: std::env::var("POS_ACCESS_TOKEN").unwrap_or_default(),
                timeout_ms: std::env::var("POS_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30_000),
            },
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }
}
