use super::packet::FirewallPacket;
use super::rules::{FirewallAction, FirewallRule};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verdict {
    Rule(FirewallAction),
    Default,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Rule(action) => write!(f, "{}", action),
            Verdict::Default => write!(f, "default"),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// パケット1件分の結果行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub action: Verdict,
    #[serde(rename = "rule", serialize_with = "serialize_rule_line")]
    pub rule_line: Option<usize>,
    pub direction: String,
    pub ip: String,
    pub port: String,
    pub flag: String,
}

impl MatchResult {
    pub fn assemble(packet: &FirewallPacket, matched: Option<&FirewallRule>) -> Self {
        let (action, rule_line) = match matched {
            Some(rule) => (Verdict::Rule(rule.action()), Some(rule.source_line())),
            None => (Verdict::Default, None),
        };
        MatchResult {
            action,
            rule_line,
            direction: packet.raw.direction.clone(),
            ip: packet.raw.ip.clone(),
            port: packet.raw.port.clone(),
            flag: packet.raw.flag.clone(),
        }
    }

    pub fn rule_reference(&self) -> String {
        self.rule_line.map(|l| l.to_string()).unwrap_or_default()
    }

    /// `(action, rule, direction, ip, port, flag)` の6フィールド
    pub fn row(&self) -> [String; 6] {
        [
            self.action.to_string(),
            self.rule_reference(),
            self.direction.clone(),
            self.ip.clone(),
            self.port.clone(),
            self.flag.clone(),
        ]
    }
}

fn serialize_rule_line<S: Serializer>(line: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    match line {
        Some(l) => serializer.collect_str(l),
        None => serializer.serialize_str(""),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rules: usize,
    pub packets: usize,
    pub matched: BTreeMap<String, usize>,
    pub defaulted: usize,
}

impl RunSummary {
    pub fn from_results(rules: usize, results: &[MatchResult]) -> Self {
        let mut summary = RunSummary {
            rules,
            packets: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.action {
                Verdict::Rule(action) => {
                    *summary.matched.entry(action.to_string()).or_insert(0) += 1;
                }
                Verdict::Default => summary.defaulted += 1,
            }
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ルール{}件, パケット{}件", self.rules, self.packets)?;
        for (action, count) in &self.matched {
            write!(f, ", {}={}", action, count)?;
        }
        write!(f, ", default={}", self.defaulted)
    }
}
