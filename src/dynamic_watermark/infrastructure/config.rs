use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dynamic_watermark.toml";
pub const ENV_PREFIX: &str = "DYNAMIC_WATERMARK_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Where the HTTP API stores the most recent result for `/preview` and `/download`.
    pub output_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3300".to_string(),
            output_path: PathBuf::from("output.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// No timeout unless set.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: concat!("dynamic_watermark/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Extra font file made available to text watermarks.
    pub font_file: Option<PathBuf>,
    pub load_system_fonts: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_file: None,
            load_system_fonts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file, then `DYNAMIC_WATERMARK_*` environment variables.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let file = match path {
            Some(path) => Toml::file_exact(path),
            None => Toml::file(DEFAULT_CONFIG_FILE),
        };
        Self::figment(file).extract()
    }

    fn figment(file: figment::providers::Data<Toml>) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load(None)?;
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.server.bind, "0.0.0.0:3300");
            assert_eq!(config.fetch.timeout_secs, None);
            assert!(config.render.load_system_fonts);
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [server]
                bind = "127.0.0.1:8080"

                [fetch]
                timeout_secs = 5

                [log]
                filter = "debug"
                "#,
            )?;
            jail.set_env("DYNAMIC_WATERMARK_LOG__FILTER", "warn");
            jail.set_env("DYNAMIC_WATERMARK_SERVER__OUTPUT_PATH", "out/latest.png");

            let config = AppConfig::load(Some(Path::new("custom.toml")))?;
            assert_eq!(config.server.bind, "127.0.0.1:8080");
            assert_eq!(config.server.output_path, PathBuf::from("out/latest.png"));
            assert_eq!(config.fetch.timeout_secs, Some(5));
            assert_eq!(config.log.filter, "warn");
            assert!(config.render.font_file.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(AppConfig::load(Some(Path::new("missing.toml"))).is_err());
            Ok(())
        });
    }
}
