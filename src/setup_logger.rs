use crate::core::error::InitError;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// 標準出力は結果行に使うため、ログは標準エラーかファイルに出す
pub fn setup_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), InitError> {
    let mut builder = Builder::new();

    builder
        // ログレベルの設定
        .filter_level(level)
        // タイムスタンプ付きのフォーマット
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        });

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| InitError::Logger(format!("{}: {}", path.display(), e)))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(Target::Stderr);
        }
    }

    builder
        .try_init()
        .map_err(|e| InitError::Logger(e.to_string()))
}
