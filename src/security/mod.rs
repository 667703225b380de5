pub mod firewall;

pub use firewall::RuleSet;
