use super::packet::FirewallPacket;
use super::rules::FirewallRule;
use super::verdict::MatchResult;
use crate::core::error::{SimError, SimResult};
use log::debug;

/// ファイル順に並んだ検証済みルール。評価中は読み取り専用
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<FirewallRule>,
}

impl RuleSet {
    pub fn new(mut rules: Vec<FirewallRule>) -> Self {
        rules.sort_by_key(|r| r.source_line());
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 最初に一致したルール（なければ `None`）
    pub fn evaluate(&self, packet: &FirewallPacket) -> SimResult<Option<&FirewallRule>> {
        evaluate(&self.rules, packet)
    }

    pub fn check(&self, packet: &FirewallPacket) -> SimResult<MatchResult> {
        let matched = self.evaluate(packet)?;
        match matched {
            Some(rule) => debug!(
                "パケット(行{})がルール(行{})に一致しました: {}",
                packet.source_line,
                rule.source_line(),
                rule
            ),
            None => debug!(
                "パケット(行{})に一致するルールがありません: default",
                packet.source_line
            ),
        }
        Ok(MatchResult::assemble(packet, matched))
    }

    pub fn check_all(&self, packets: &[FirewallPacket]) -> SimResult<Vec<MatchResult>> {
        packets.iter().map(|packet| self.check(packet)).collect()
    }
}

/// first-match-wins で評価する
pub fn evaluate<'a>(
    rules: &'a [FirewallRule],
    packet: &FirewallPacket,
) -> SimResult<Option<&'a FirewallRule>> {
    rules
        .iter()
        .find_map(|rule| match applies(rule, packet) {
            Ok(true) => Some(Ok(rule)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        })
        .transpose()
}

fn applies(rule: &FirewallRule, packet: &FirewallPacket) -> SimResult<bool> {
    if rule.direction() != packet.direction {
        return Ok(false);
    }

    let ip_ok = rule
        .ip_spec()
        .matches(packet.ip)
        .map_err(|e| SimError::InternalMatch {
            line: rule.source_line(),
            reason: e.to_string(),
        })?;
    if !ip_ok {
        return Ok(false);
    }

    if !rule.ports().contains(packet.port) {
        return Ok(false);
    }

    // established指定のないルールはフラグに関係なく適用される
    Ok(!rule.requires_established() || packet.established)
}
