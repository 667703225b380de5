use super::{split_fields, strip_comment};
use crate::core::error::{SimError, SimResult};
use crate::network::{IpSpec, PortSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            _ => Err(format!("invalid direction '{}'", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FirewallAction {
    Accept,
    Drop,
    Deny,
}

impl FromStr for FirewallAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(FirewallAction::Accept),
            "drop" => Ok(FirewallAction::Drop),
            "deny" => Ok(FirewallAction::Deny),
            _ => Err(format!("invalid action '{}'", s)),
        }
    }
}

impl fmt::Display for FirewallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirewallAction::Accept => write!(f, "accept"),
            FirewallAction::Drop => write!(f, "drop"),
            FirewallAction::Deny => write!(f, "deny"),
        }
    }
}

const ESTABLISHED: &str = "established";

/// 検証済みのルール。`parse` 以外では生成できない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    direction: Direction,
    action: FirewallAction,
    ip_spec: IpSpec,
    ports: PortSet,
    requires_established: bool,
    source_line: usize,
}

impl FirewallRule {
    /// 1行をルールに変換する。空行・コメント行は `Ok(None)`
    pub fn parse(line_text: &str, line_no: usize, file_name: &str) -> SimResult<Option<Self>> {
        let content = strip_comment(line_text);
        if content.is_empty() {
            return Ok(None);
        }

        let err = |reason: String| SimError::rule_syntax(file_name, line_no, reason);

        let fields = split_fields(content);
        if fields.len() != 4 && fields.len() != 5 {
            return Err(err("rule must have 4 or 5 fields".to_string()));
        }

        let direction = fields[0].parse::<Direction>().map_err(err)?;
        let action = fields[1].parse::<FirewallAction>().map_err(err)?;
        let ip_spec = IpSpec::parse(fields[2]).map_err(|e| err(e.to_string()))?;
        let ports = PortSet::parse(fields[3]).map_err(|e| err(e.to_string()))?;

        let requires_established = match fields.get(4) {
            None => false,
            Some(&ESTABLISHED) => true,
            Some(other) => {
                return Err(err(format!(
                    "invalid flag '{}', expected '{}'",
                    other, ESTABLISHED
                )))
            }
        };

        Ok(Some(FirewallRule {
            direction,
            action,
            ip_spec,
            ports,
            requires_established,
            source_line: line_no,
        }))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn action(&self) -> FirewallAction {
        self.action
    }

    pub fn ip_spec(&self) -> &IpSpec {
        &self.ip_spec
    }

    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    pub fn requires_established(&self) -> bool {
        self.requires_established
    }

    pub fn source_line(&self) -> usize {
        self.source_line
    }
}

impl fmt::Display for FirewallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.direction, self.action, self.ip_spec, self.ports
        )?;
        if self.requires_established {
            write!(f, " {}", ESTABLISHED)?;
        }
        Ok(())
    }
}

/// ルールファイル全体を解析する。最初の不正な行でエラーを返す
pub fn parse_rules<S: AsRef<str>>(lines: &[S], file_name: &str) -> SimResult<Vec<FirewallRule>> {
    let mut rules = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(rule) = FirewallRule::parse(line.as_ref(), idx + 1, file_name)? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason_of(line: &str) -> String {
        match FirewallRule::parse(line, 1, "rules.txt") {
            Err(SimError::RuleSyntax { reason, .. }) => reason,
            other => panic!("ルールエラーを期待しましたが {:?} でした", other),
        }
    }

    #[test]
    fn test_parse_full_rule() {
        let rule = FirewallRule::parse("out deny 192.168.0.0/16 22,80 established", 9, "rules.txt")
            .unwrap()
            .unwrap();
        assert_eq!(rule.direction(), Direction::Out);
        assert_eq!(rule.action(), FirewallAction::Deny);
        assert!(rule.ports().contains(22));
        assert!(rule.ports().contains(80));
        assert!(rule.requires_established());
        assert_eq!(rule.source_line(), 9);
        assert_eq!(rule.to_string(), "out deny 192.168.0.0/16 22,80 established");
    }

    #[test]
    fn test_blank_and_comment_lines_yield_nothing() {
        assert!(FirewallRule::parse("", 1, "r").unwrap().is_none());
        assert!(FirewallRule::parse("   \t ", 2, "r").unwrap().is_none());
        assert!(FirewallRule::parse("# in maybe * *", 3, "r").unwrap().is_none());
        assert!(FirewallRule::parse("   # indented comment", 4, "r").unwrap().is_none());
    }

    #[test]
    fn test_trailing_comment_is_ignored() {
        let with_comment = FirewallRule::parse("in accept * * # allow", 1, "r").unwrap();
        let without = FirewallRule::parse("in accept * *", 1, "r").unwrap();
        assert_eq!(with_comment, without);

        let glued = FirewallRule::parse("in accept * *#established", 1, "r").unwrap().unwrap();
        assert!(!glued.requires_established());
    }

    #[test]
    fn test_each_failure_has_its_own_reason() {
        assert_eq!(reason_of("in accept *"), "rule must have 4 or 5 fields");
        assert_eq!(reason_of("in accept * * established extra"), "rule must have 4 or 5 fields");
        assert_eq!(reason_of("inbound accept * *"), "invalid direction 'inbound'");
        assert_eq!(reason_of("in maybe * *"), "invalid action 'maybe'");
        assert_eq!(reason_of("in accept 10.0.0.1 *"), "invalid ip range '10.0.0.1'");
        assert_eq!(reason_of("in accept 10.0.0.256/8 *"), "invalid ip address '10.0.0.256'");
        assert_eq!(reason_of("in accept 10.0.0.0/33 *"), "invalid prefix length '33'");
        assert_eq!(reason_of("in accept * 70000"), "invalid port '70000'");
        assert_eq!(reason_of("in accept * ,"), "invalid port list ','");
        assert_eq!(
            reason_of("in accept * * new"),
            "invalid flag 'new', expected 'established'"
        );
    }

    #[test]
    fn test_non_ascii_whitespace_does_not_separate_fields() {
        assert_eq!(reason_of("in\u{3000}accept * *"), "rule must have 4 or 5 fields");
        assert_eq!(
            reason_of("in\u{00A0}accept * * *"),
            "invalid direction 'in\u{00A0}accept'"
        );
        assert!(FirewallRule::parse("\u{3000}", 1, "r").is_err());
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(reason_of("IN accept * *"), "invalid direction 'IN'");
        assert_eq!(reason_of("in ACCEPT * *"), "invalid action 'ACCEPT'");
    }

    #[test]
    fn test_parse_rules_keeps_file_line_numbers() {
        let lines = ["# header", "", "in accept * 80", "   ", "out drop * *"];
        let rules = parse_rules(&lines, "rules.txt").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].source_line(), 3);
        assert_eq!(rules[1].source_line(), 5);
    }

    #[test]
    fn test_parse_rules_stops_at_first_error() {
        let lines = ["in accept * *", "in maybe * *", "in nope * *"];
        match parse_rules(&lines, "rules.txt") {
            Err(SimError::RuleSyntax { file, line, .. }) => {
                assert_eq!(file, "rules.txt");
                assert_eq!(line, 2);
            }
            other => panic!("ルールエラーを期待しましたが {:?} でした", other),
        }
    }
}
