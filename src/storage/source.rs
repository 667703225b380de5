use crate::core::error::{SimError, SimResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 行単位の入力元。`name` は診断メッセージに使われる
#[async_trait]
pub trait LineSource: Send + Sync {
    fn name(&self) -> String;
    async fn read_lines(&self) -> SimResult<Vec<String>>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl LineSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_lines(&self) -> SimResult<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SimError::FileAccess {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(split_lines(&content))
    }
}

pub struct MemorySource {
    name: String,
    lines: Vec<String>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self::new(name, split_lines(text))
    }
}

#[async_trait]
impl LineSource for MemorySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn read_lines(&self) -> SimResult<Vec<String>> {
        Ok(self.lines.clone())
    }
}

/// `\n`・`\r\n`・`\r` のいずれも行末として扱う
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(pos) => {
                lines.push(rest[..pos].to_string());
                let eol = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[pos + eol..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    lines
}
