//! 結果行の表示形式

use crate::core::error::SimError;
use crate::security::firewall::MatchResult;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// `accept(1)     in  10.0.0.5        80    0` の形式
pub fn format_result(result: &MatchResult) -> String {
    let prefix = format!("{}({})", result.action, result.rule_reference());
    let suffix = format!(
        "{:<3} {:<15} {:<5} {}",
        result.direction, result.ip, result.port, result.flag
    );
    format!("{:<12} {}", prefix, suffix)
}

pub fn format_error(err: &SimError) -> String {
    format!("Simulator error: {}", err)
}

pub fn write_results<W: Write>(
    out: &mut W,
    results: &[MatchResult],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for result in results {
                writeln!(out, "{}", format_result(result))?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::simulate_lines;

    fn results() -> Vec<MatchResult> {
        simulate_lines(
            "rules.txt",
            &["in accept 10.0.0.0/24 80"],
            "packets.txt",
            &["in 10.0.0.5 80 0", "out 8.8.8.8 53 1"],
        )
        .unwrap()
    }

    #[test]
    fn test_text_layout() {
        let results = results();
        assert_eq!(format_result(&results[0]), "accept(1)    in  10.0.0.5        80    0");
        assert_eq!(format_result(&results[1]), "default()    out 8.8.8.8         53    1");
    }

    #[test]
    fn test_long_prefix_is_not_truncated() {
        let results = simulate_lines(
            "rules.txt",
            &vec!["# pad"; 12345].into_iter().chain(["in deny * *"]).collect::<Vec<_>>(),
            "packets.txt",
            &["in 1.1.1.1 1 0"],
        )
        .unwrap();
        assert_eq!(format_result(&results[0]), "deny(12346)  in  1.1.1.1         1     0");
    }

    #[test]
    fn test_write_results_json() {
        let mut buf = Vec::new();
        write_results(&mut buf, &results(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["action"], "accept");
        assert_eq!(parsed[0]["rule"], "1");
        assert_eq!(parsed[1]["action"], "default");
        assert_eq!(parsed[1]["rule"], "");
    }

    #[test]
    fn test_write_results_text() {
        let mut buf = Vec::new();
        write_results(&mut buf, &results(), OutputFormat::Text).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_error_line() {
        let err = SimError::rule_syntax("rules.txt", 1, "invalid action 'maybe'");
        assert_eq!(format_error(&err), "Simulator error: rules.txt:1: invalid action 'maybe'");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
