use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("{}: cannot read file ({})", path.display(), source)]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}:{line}: {reason}")]
    RuleSyntax {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("{file}:{line}: {reason}")]
    PacketSyntax {
        file: String,
        line: usize,
        reason: String,
    },

    // 検証済みのルールでは発生しないはず
    #[error("rule on line {line} could not be evaluated: {reason}")]
    InternalMatch { line: usize, reason: String },

    #[error("evaluation worker failed: {0}")]
    Worker(String),
}

impl SimError {
    pub fn rule_syntax(file: &str, line: usize, reason: impl Into<String>) -> Self {
        SimError::RuleSyntax {
            file: file.to_string(),
            line,
            reason: reason.into(),
        }
    }

    pub fn packet_syntax(file: &str, line: usize, reason: impl Into<String>) -> Self {
        SimError::PacketSyntax {
            file: file.to_string(),
            line,
            reason: reason.into(),
        }
    }

    /// 診断に含まれる行番号（ファイル単位のエラーには無い）
    pub fn line(&self) -> Option<usize> {
        match self {
            SimError::RuleSyntax { line, .. }
            | SimError::PacketSyntax { line, .. }
            | SimError::InternalMatch { line, .. } => Some(*line),
            SimError::FileAccess { .. } | SimError::Worker(_) => None,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum InitError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ロガーのセットアップに失敗しました: {0}")]
    Logger(String),
}
