// Layer 3 - Analysis
// Ordered chain of windowed stages consuming each reading

// Common utilities
pub mod common;

pub mod chain;
pub mod statistics_stage;
pub mod threshold_stage;
pub mod rate_stage;

pub use chain::{AnalysisChain, AnalysisChainStats, ChainOutcome, Stage, StageOutcome, StageStats};
pub use statistics_stage::StatisticsStage;
pub use threshold_stage::ThresholdStage;
pub use rate_stage::{pairwise_change, RateOfChangeStage};
