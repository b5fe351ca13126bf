//! 统一配置中心
//!
//! 按以下顺序合并配置，后者覆盖前者：
//! - 内置默认值
//! - 可选的 YAML 文件（`CHAT_CONFIG_FILE`，默认 `chat-relay.yaml`）
//! - 以 `CHAT_` 为前缀的环境变量，嵌套字段用 `__` 分隔

use std::env;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CHAT_";
pub const CONFIG_FILE_ENV: &str = "CHAT_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "chat-relay.yaml";

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 在线状态清理配置
    pub presence: PresenceConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置；`url` 为空时使用内存存储
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

/// 在线状态清理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// 两次清理之间的间隔（秒）
    pub sweep_interval_secs: u64,
    /// 超过该时长未心跳即视为离开（秒）
    pub inactivity_window_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 15,
            inactivity_window_secs: 10,
        }
    }
}

impl PresenceConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn inactivity_window(&self) -> Duration {
        Duration::from_secs(self.inactivity_window_secs)
    }
}

impl AppConfig {
    /// 加载配置：默认值 → YAML 文件 → 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::figment(&path)
            .extract::<AppConfig>()
            .map_err(Box::new)?
            .validated()
    }

    /// 构建配置来源，文件不存在时会被忽略
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "host cannot be empty".to_string(),
            ));
        }

        if self.presence.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidPresenceConfig(
                "sweep interval must be greater than 0".to_string(),
            ));
        }

        if self.presence.inactivity_window_secs == 0 {
            return Err(ConfigError::InvalidPresenceConfig(
                "inactivity window must be greater than 0".to_string(),
            ));
        }

        if let Some(url) = &self.database.url {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidDatabaseUrl(
                    "database URL cannot be blank".to_string(),
                ));
            }
            if self.database.max_connections == 0 {
                return Err(ConfigError::InvalidDatabaseConfig(
                    "max connections must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
    #[error("Invalid database configuration: {0}")]
    InvalidDatabaseConfig(String),
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid presence configuration: {0}")]
    InvalidPresenceConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_reference_timings() {
        let config = AppConfig::default();
        assert_eq!(config.presence.sweep_interval(), Duration::from_secs(15));
        assert_eq!(config.presence.inactivity_window(), Duration::from_secs(10));
        assert!(config.database.url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_nested_fields() {
        Jail::expect_with(|jail| {
            jail.set_env("CHAT_SERVER__PORT", "8088");
            jail.set_env("CHAT_PRESENCE__SWEEP_INTERVAL_SECS", "3");
            jail.set_env("CHAT_DATABASE__URL", "postgres://chat@db/chat");

            let config: AppConfig = AppConfig::figment("missing.yaml").extract()?;
            assert_eq!(config.server.port, 8088);
            assert_eq!(config.presence.sweep_interval_secs, 3);
            assert_eq!(config.presence.inactivity_window_secs, 10);
            assert_eq!(config.database.url.as_deref(), Some("postgres://chat@db/chat"));
            Ok(())
        });
    }

    #[test]
    fn yaml_file_is_merged_under_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "relay.yaml",
                r#"
server:
  host: 0.0.0.0
  port: 7000
presence:
  inactivity_window_secs: 30
"#,
            )?;
            jail.set_env("CHAT_SERVER__PORT", "7001");

            let config: AppConfig = AppConfig::figment("relay.yaml").extract()?;
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 7001);
            assert_eq!(config.presence.inactivity_window_secs, 30);
            assert_eq!(config.presence.sweep_interval_secs, 15);
            Ok(())
        });
    }

    #[test]
    fn validation_rejects_zero_timings() {
        let mut config = AppConfig::default();
        config.presence.sweep_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPresenceConfig(_))
        ));

        let mut config = AppConfig::default();
        config.presence.inactivity_window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_checks_database_settings() {
        let mut config = AppConfig::default();
        config.database.url = Some("  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDatabaseUrl(_))
        ));

        config.database.url = Some("postgres://chat@db/chat".to_string());
        config.database.max_connections = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDatabaseConfig(_))
        ));
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let server = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
        };
        assert_eq!(server.bind_address(), "0.0.0.0:5000");
    }
}
