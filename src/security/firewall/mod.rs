pub mod filter;
pub mod packet;
pub mod rules;
pub mod verdict;

pub use filter::{evaluate, RuleSet};
pub use packet::{parse_packets, FirewallPacket};
pub use rules::{parse_rules, Direction, FirewallAction, FirewallRule};
pub use verdict::{MatchResult, RunSummary, Verdict};

/// `#` 以降を取り除き前後のASCII空白を落とす
pub(crate) fn strip_comment(line: &str) -> &str {
    let content = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    content.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// ASCII空白でフィールドに分割する（全角スペースなどは区切りにならない）
pub(crate) fn split_fields(content: &str) -> Vec<&str> {
    content
        .split(|c: char| c.is_ascii_whitespace())
        .filter(|field| !field.is_empty())
        .collect()
}
