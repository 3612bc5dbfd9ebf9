pub mod analyze;
pub mod init;

pub use analyze::{handle_analyze, handle_risk, AnalyzeConfig, RiskCommandConfig};
pub use init::{init_config, init_config_at};
