pub mod core;
pub mod network;
pub mod report;
pub mod security;
pub mod setup_logger;
pub mod simulator;
pub mod storage;

pub use crate::core::error::{SimError, SimResult};
pub use security::firewall::{Direction, FirewallAction, FirewallPacket, FirewallRule, MatchResult, RuleSet, Verdict};
pub use simulator::{fwsim, simulate_lines, Simulator};
