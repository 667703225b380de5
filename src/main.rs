use clap::Parser;
use fwsim::core::{Configuration, InitError};
use fwsim::report::{format_error, write_results, OutputFormat};
use fwsim::setup_logger::setup_logger;
use fwsim::Simulator;
use log::{error, info};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fwsim")]
#[command(version)]
#[command(about = "firewall simulator", long_about = None)]
struct Cli {
    /// filename with firewall rules
    rules: PathBuf,

    /// filename with packets
    packets: PathBuf,

    /// Number of evaluation workers
    #[arg(long, short, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    workers: Option<usize>,

    /// Output format
    #[arg(long, short)]
    format: Option<OutputFormat>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<Configuration, InitError> {
    let mut config = Configuration::from_env()?;

    // コマンドライン引数は環境変数より優先する
    if let Some(workers) = cli.workers {
        config.engine.workers = workers;
    }
    if let Some(format) = cli.format {
        config.output = format;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }

    setup_logger(config.level_filter()?, config.logging.file.as_deref())?;
    Ok(config)
}


#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("初期化に失敗しました: {}", e);
            return ExitCode::from(2);
        }
    };
    info!(
        "シミュレーションを開始します: rules={} packets={} workers={}",
        cli.rules.display(),
        cli.packets.display(),
        config.engine.workers
    );

    let simulator = Simulator::new(config.engine.workers);
    match simulator.run_files(&cli.rules, &cli.packets).await {
        Ok(results) => {
            let stdout = io::stdout();
            if let Err(e) = write_results(&mut stdout.lock(), &results, config.output) {
                error!("結果の出力に失敗しました: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.line() {
                Some(line) => error!("{}行目でシミュレーションを中断しました: {}", line, e),
                None => error!("シミュレーションを中断しました: {}", e),
            }
            println!("{}", format_error(&e));
            ExitCode::FAILURE
        }
    }
}
