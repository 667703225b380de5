use crate::core::error::InitError;
use crate::report::OutputFormat;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// パケット評価に使うワーカー数（1なら逐次実行）
    pub workers: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            logging: LoggingConfig {
                level: "warn".to_string(),
                file: None,
            },
            engine: EngineConfig { workers: 1 },
            output: OutputFormat::Text,
        }
    }
}

impl Configuration {
    pub fn from_env() -> Result<Self, InitError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Configuration::default();

        let level = lookup("FWSIM_LOG_LEVEL").unwrap_or(defaults.logging.level);
        parse_level(&level)?;

        let workers = match lookup("FWSIM_WORKERS") {
            Some(raw) => parse_workers(&raw)?,
            None => defaults.engine.workers,
        };

        let output = match lookup("FWSIM_OUTPUT") {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .map_err(|_| InitError::Config(format!("FWSIM_OUTPUTが無効です: {}", raw)))?,
            None => defaults.output,
        };

        Ok(Configuration {
            logging: LoggingConfig {
                level,
                file: lookup("FWSIM_LOG_FILE")
                    .filter(|p| !p.trim().is_empty())
                    .map(PathBuf::from),
            },
            engine: EngineConfig { workers },
            output,
        })
    }

    pub fn level_filter(&self) -> Result<LevelFilter, InitError> {
        parse_level(&self.logging.level)
    }
}

pub fn parse_workers(raw: &str) -> Result<usize, InitError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(InitError::Config(format!("FWSIM_WORKERSが無効です: {}", raw))),
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, InitError> {
    LevelFilter::from_str(raw.trim())
        .map_err(|e| InitError::Config(format!("FWSIM_LOG_LEVELが無効です: {} ({})", raw, e)))
}
