// Notification Type Constants
// Centralized names so stages, the log and tests agree on event kinds

pub const READING_RECEIVED: &str = "reading_received";
pub const STATISTIC_COMPUTED: &str = "statistic_computed";
pub const THRESHOLD_BREACH: &str = "threshold_breach";
pub const RAPID_INCREASE: &str = "rapid_increase";
pub const PIPELINE_FAULT: &str = "pipeline_fault";

pub const ALL_KINDS: [&str; 5] = [
    READING_RECEIVED,
    STATISTIC_COMPUTED,
    THRESHOLD_BREACH,
    RAPID_INCREASE,
    PIPELINE_FAULT,
];
