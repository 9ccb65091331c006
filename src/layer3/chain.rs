// Analysis Chain - Ordered composition of analysis stages
// Every reading enters at the first stage and is handed on, unmodified, until the
// last stage completes or a stage fails closed

use std::sync::Arc;
use tracing::{debug, info};

use crate::core::config::MonitorConfig;
use crate::core::error::MonitorError;
use crate::core::events::{Notification, NotificationLog};
use crate::core::types::{system_clock, Clock, Reading, StageKind};
use crate::layer2::dispatcher::ReadingConsumer;

use super::rate_stage::RateOfChangeStage;
use super::statistics_stage::StatisticsStage;
use super::threshold_stage::ThresholdStage;

const SOURCE: &str = "analysis_chain";

/// What a stage asks the chain to do with the reading it just handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Forward,
    Halt,
}

/// How far a reading travelled through the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    Completed,
    Halted { at: StageKind },
}

#[derive(Debug, Clone)]
pub struct StageStats {
    pub stage: String,
    pub readings_processed: u64,
    pub notifications_fired: u64,
    pub faults: u64,
    pub window_len: Option<usize>,
}

pub enum Stage {
    Statistics(StatisticsStage),
    Threshold(ThresholdStage),
    RateOfChange(RateOfChangeStage),
}

impl Stage {
    /// Windowed stages measure sample age against `clock`
    pub fn from_kind(kind: StageKind, config: &MonitorConfig, log: Arc<NotificationLog>, clock: Clock) -> Self {
        match kind {
            StageKind::Statistics => {
                Stage::Statistics(StatisticsStage::new(&config.statistics, log).with_clock(clock))
            }
            StageKind::Threshold => Stage::Threshold(ThresholdStage::new(&config.threshold, log)),
            StageKind::RateOfChange => {
                Stage::RateOfChange(RateOfChangeStage::new(&config.rate, log).with_clock(clock))
            }
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Statistics(_) => StageKind::Statistics,
            Stage::Threshold(_) => StageKind::Threshold,
            Stage::RateOfChange(_) => StageKind::RateOfChange,
        }
    }

    pub fn handle(&mut self, reading: &Reading) -> StageOutcome {
        match self {
            Stage::Statistics(stage) => stage.handle(reading),
            Stage::Threshold(stage) => stage.handle(reading),
            Stage::RateOfChange(stage) => stage.handle(reading),
        }
    }

    pub fn stats(&self) -> StageStats {
        match self {
            Stage::Statistics(stage) => stage.stats(),
            Stage::Threshold(stage) => stage.stats(),
            Stage::RateOfChange(stage) => stage.stats(),
        }
    }
}

pub struct AnalysisChain {
    stages: Vec<Stage>,
    log: Arc<NotificationLog>,

    readings_received: u64,
    readings_completed: u64,
    readings_halted: u64,
}

impl AnalysisChain {
    pub fn new(stages: Vec<Stage>, log: Arc<NotificationLog>) -> Self {
        let order: Vec<StageKind> = stages.iter().map(Stage::kind).collect();
        info!(stages = ?order, "AnalysisChain initialized");

        Self {
            stages,
            log,
            readings_received: 0,
            readings_completed: 0,
            readings_halted: 0,
        }
    }

    /// Build the stages in the configured order, windows aged by wall-clock time
    pub fn from_config(config: &MonitorConfig, log: Arc<NotificationLog>) -> Self {
        Self::from_config_with_clock(config, log, system_clock())
    }

    pub fn from_config_with_clock(config: &MonitorConfig, log: Arc<NotificationLog>, clock: Clock) -> Self {
        let stages = config
            .stage_order
            .iter()
            .map(|kind| Stage::from_kind(*kind, config, log.clone(), clock.clone()))
            .collect();
        Self::new(stages, log)
    }

    pub fn process(&mut self, reading: &Reading) -> ChainOutcome {
        self.readings_received += 1;
        self.log.record(SOURCE, reading.timestamp, Notification::ReadingReceived { reading: *reading });

        let span = tracing::debug_span!("reading", timestamp = reading.timestamp, value = reading.value);
        let _enter = span.enter();

        for stage in self.stages.iter_mut() {
            if stage.handle(reading) == StageOutcome::Halt {
                let at = stage.kind();
                self.readings_halted += 1;
                debug!(stage = %at, "Reading stopped by stage");
                return ChainOutcome::Halted { at };
            }
        }

        self.readings_completed += 1;
        ChainOutcome::Completed
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_order(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }

    pub fn log(&self) -> &Arc<NotificationLog> {
        &self.log
    }

    pub fn get_stats(&self) -> AnalysisChainStats {
        let stages: Vec<StageStats> = self.stages.iter().map(Stage::stats).collect();
        AnalysisChainStats {
            readings_received: self.readings_received,
            readings_completed: self.readings_completed,
            readings_halted: self.readings_halted,
            total_notifications: stages.iter().map(|s| s.notifications_fired).sum(),
            stages,
        }
    }
}

impl ReadingConsumer for AnalysisChain {
    /// Halting is a reported per-reading outcome, not a consumer failure
    fn on_reading(&mut self, reading: &Reading) -> Result<(), MonitorError> {
        self.process(reading);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisChainStats {
    pub readings_received: u64,
    pub readings_completed: u64,
    pub readings_halted: u64,
    pub total_notifications: u64,
    pub stages: Vec<StageStats>,
}
