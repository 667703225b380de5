use crate::core::error::{SimError, SimResult};
use crate::security::firewall::{parse_packets, parse_rules, FirewallPacket, MatchResult, RuleSet, RunSummary};
use crate::storage::{FileSource, LineSource};
use futures::future::try_join_all;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

pub struct Simulator {
    workers: usize,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Simulator {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub async fn run_files(
        &self,
        rules_path: impl AsRef<Path>,
        packets_path: impl AsRef<Path>,
    ) -> SimResult<Vec<MatchResult>> {
        self.run(&FileSource::new(rules_path), &FileSource::new(packets_path))
            .await
    }

    /// ルール→パケットの順に読み込み・検証し、全パケットを評価する
    pub async fn run(
        &self,
        rules_source: &dyn LineSource,
        packets_source: &dyn LineSource,
    ) -> SimResult<Vec<MatchResult>> {
        let rule_lines = rules_source.read_lines().await?;
        let packet_lines = packets_source.read_lines().await?;

        let rules = RuleSet::new(parse_rules(&rule_lines, &rules_source.name())?);
        let packets = parse_packets(&packet_lines, &packets_source.name())?;
        debug!(
            "ルール{}件, パケット{}件を読み込みました",
            rules.len(),
            packets.len()
        );

        let rule_count = rules.len();
        let results = if self.workers > 1 && packets.len() > 1 {
            evaluate_parallel(Arc::new(rules), packets, self.workers).await?
        } else {
            rules.check_all(&packets)?
        };

        info!("{}", RunSummary::from_results(rule_count, &results));
        Ok(results)
    }
}

/// パケットを連続したチャンクに分けて並列評価し、入力順に結合する
async fn evaluate_parallel(
    rules: Arc<RuleSet>,
    packets: Vec<FirewallPacket>,
    workers: usize,
) -> SimResult<Vec<MatchResult>> {
    let chunk_size = packets.len().div_ceil(workers);

    let handles = packets
        .chunks(chunk_size)
        .map(|chunk| {
            let rules = Arc::clone(&rules);
            let chunk = chunk.to_vec();
            tokio::task::spawn_blocking(move || rules.check_all(&chunk))
        })
        .collect::<Vec<_>>();

    let chunks = try_join_all(handles)
        .await
        .map_err(|e| SimError::Worker(e.to_string()))?;

    let mut results = Vec::with_capacity(packets.len());
    for chunk in chunks {
        results.extend(chunk?);
    }
    Ok(results)
}

/// ファイルを介さずに行の列を直接評価する
pub fn simulate_lines<R, P>(
    rules_name: &str,
    rule_lines: &[R],
    packets_name: &str,
    packet_lines: &[P],
) -> SimResult<Vec<MatchResult>>
where
    R: AsRef<str>,
    P: AsRef<str>,
{
    let rules = RuleSet::new(parse_rules(rule_lines, rules_name)?);
    let packets = parse_packets(packet_lines, packets_name)?;
    rules.check_all(&packets)
}

/// ルールファイルとパケットファイルのパスから結果行を得る
pub async fn fwsim(
    rules_path: impl AsRef<Path>,
    packets_path: impl AsRef<Path>,
) -> SimResult<Vec<MatchResult>> {
    Simulator::default().run_files(rules_path, packets_path).await
}
