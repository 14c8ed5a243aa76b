//! DIEH threshold configuration.
//!
//! A [`ThresholdRecord`] holds one [`StatConfig`] per error category plus
//! the burst and reset-escalation settings. Records are immutable once
//! loaded and are shared by every drive matched to them.
//!
//! Rule tables are `heapless::Vec`s: a TOML table with more than
//! [`MAX_ACTIONS`] rules or [`MAX_WEIGHT_EXCEPTIONS`] exceptions fails to
//! deserialize, so the completion path never sees an oversized table.
//!
//! # TOML Example
//!
//! ```toml
//! [dieh]
//! burst_delta_ms = 100
//! burst_weight_reduce = 20
//! reset_escalation = "rule_table"
//!
//! [dieh.media]
//! interval = 1800000
//! weight = 18000
//! actions = [
//!     { ratio = 30, reactivate = 5, action = "reset" },
//!     { ratio = 50, action = "end_of_life" },
//!     { ratio = 100, action = "fail" },
//! ]
//! weight_exceptions = [
//!     { code = { kind = "opcode", opcode = 0x88 }, change = 50 },
//!     { code = { kind = "sense_code", key = 3, asc = 0x11, ascq_start = 0, ascq_end = 0xFF }, change = 200 },
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::consts::{
    DEFAULT_BURST_DELTA_MS, DEFAULT_BURST_WEIGHT_REDUCE, MAX_ACTIONS, MAX_INTERVAL,
    MAX_WEIGHT_EXCEPTIONS, RATIO_MAX,
};

use super::category::ErrorCategory;
use super::flags::ActionKind;

/// Ordered action rule table of one category.
pub type ActionTable = heapless::Vec<ActionRule, MAX_ACTIONS>;

/// Ordered weight exception table of one category.
pub type WeightExceptionTable = heapless::Vec<WeightException, MAX_WEIGHT_EXCEPTIONS>;

// ─── Rules ──────────────────────────────────────────────────────────

/// One (threshold, reactivate threshold, action) entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRule {
    /// Ratio at or above which the action fires.
    #[serde(rename = "ratio")]
    pub ratio_threshold: u32,
    /// Ratio at or below which a tripped rule re-arms. `None` = never.
    #[serde(default, rename = "reactivate", skip_serializing_if = "Option::is_none")]
    pub reactivate_ratio: Option<u32>,
    /// Action requested when the rule fires.
    pub action: ActionKind,
}

impl ActionRule {
    pub const fn new(ratio_threshold: u32, reactivate_ratio: Option<u32>, action: ActionKind) -> Self {
        Self {
            ratio_threshold,
            reactivate_ratio,
            action,
        }
    }
}

/// SCSI sense data range matched by a weight exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenseCodeRange {
    pub key: u8,
    pub asc: u8,
    pub ascq_start: u8,
    pub ascq_end: u8,
}

impl SenseCodeRange {
    /// Decode the packed `0xKKAASSEE` form (key, asc, ascq start, ascq end).
    pub const fn from_packed(value: u32) -> Self {
        Self {
            key: (value >> 24) as u8,
            asc: (value >> 16) as u8,
            ascq_start: (value >> 8) as u8,
            ascq_end: value as u8,
        }
    }

    #[inline]
    pub const fn matches(&self, key: u8, asc: u8, ascq: u8) -> bool {
        self.key == key && self.asc == asc && ascq >= self.ascq_start && ascq <= self.ascq_end
    }
}

/// What a weight exception is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExceptionCode {
    /// SCSI/ATA command opcode.
    Opcode { opcode: u8 },
    /// Port request status.
    PortError { port_status: u32 },
    /// Sense key / ASC / ASCQ range.
    SenseCode(SenseCodeRange),
}

/// Multiplicative weight override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightException {
    pub code: ExceptionCode,
    /// Weight multiplier [%].
    #[serde(rename = "change")]
    pub change_percent: u32,
}

impl WeightException {
    pub const fn new(code: ExceptionCode, change_percent: u32) -> Self {
        Self {
            code,
            change_percent,
        }
    }
}

// ─── Per-Category Config ────────────────────────────────────────────

/// Rate-tracking parameters of one error category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatConfig {
    /// Sliding window length [I/Os]. Must be > 0.
    pub interval: u64,
    /// I/O-count cost of one error.
    pub weight: u64,
    /// Legacy single threshold [%] used by reset escalation.
    #[serde(default)]
    pub threshold: u32,
    /// Ordered action rules.
    #[serde(default)]
    pub actions: ActionTable,
    /// Ordered weight exceptions.
    #[serde(default)]
    pub weight_exceptions: WeightExceptionTable,
}

impl StatConfig {
    /// Config without rules or exceptions.
    pub fn new(interval: u64, weight: u64) -> Self {
        Self {
            interval,
            weight,
            threshold: 0,
            actions: ActionTable::new(),
            weight_exceptions: WeightExceptionTable::new(),
        }
    }

    /// Builder: replace the rule table.
    pub fn with_actions<I: IntoIterator<Item = ActionRule>>(mut self, rules: I) -> Self {
        self.actions = rules.into_iter().take(MAX_ACTIONS).collect();
        self
    }

    /// Builder: replace the weight exception table.
    pub fn with_exceptions<I: IntoIterator<Item = WeightException>>(mut self, exceptions: I) -> Self {
        self.weight_exceptions = exceptions.into_iter().take(MAX_WEIGHT_EXCEPTIONS).collect();
        self
    }

    /// Builder: set the legacy threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Validate parameter bounds for `category`.
    pub fn validate(&self, category: ErrorCategory) -> Result<(), ConfigError> {
        if self.interval == 0 || self.interval > MAX_INTERVAL {
            return Err(ConfigError::ValidationError(format!(
                "{category:?}: interval {} out of range [1, {MAX_INTERVAL}]",
                self.interval
            )));
        }
        if self.threshold > RATIO_MAX {
            return Err(ConfigError::ValidationError(format!(
                "{category:?}: threshold {} exceeds {RATIO_MAX}",
                self.threshold
            )));
        }
        for (i, rule) in self.actions.iter().enumerate() {
            if rule.ratio_threshold > RATIO_MAX {
                return Err(ConfigError::ValidationError(format!(
                    "{category:?}: action {i} ratio {} exceeds {RATIO_MAX}",
                    rule.ratio_threshold
                )));
            }
            if let Some(reactivate) = rule.reactivate_ratio {
                if reactivate >= rule.ratio_threshold {
                    return Err(ConfigError::ValidationError(format!(
                        "{category:?}: action {i} reactivate {reactivate} must be below ratio {}",
                        rule.ratio_threshold
                    )));
                }
            }
        }
        for (i, wtx) in self.weight_exceptions.iter().enumerate() {
            if let ExceptionCode::SenseCode(range) = wtx.code {
                if range.ascq_start > range.ascq_end {
                    return Err(ConfigError::ValidationError(format!(
                        "{category:?}: weight exception {i} ascq range {:#04x}..{:#04x} is empty",
                        range.ascq_start, range.ascq_end
                    )));
                }
            }
        }
        Ok(())
    }
}

// ─── Threshold Record ───────────────────────────────────────────────

/// Which mechanism decides what a reset request turns into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetEscalation {
    /// Rule-table actions are returned as evaluated.
    #[default]
    RuleTable,
    /// Rule-table resets go through reset → power-cycle → fail escalation.
    Legacy,
}

/// Optional extras of the legacy escalation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyControl {
    /// Add `FAIL_CALL_HOME` when escalation ends in `FAIL`.
    #[serde(default)]
    pub fail_call_home: bool,
    /// Add `END_OF_LIFE` when the power-cycle budget is consumed.
    #[serde(default)]
    pub end_of_life: bool,
    /// Add `END_OF_LIFE_CALL_HOME` when the power-cycle budget is consumed.
    #[serde(default)]
    pub end_of_life_call_home: bool,
}

/// Complete DIEH configuration of one drive class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdRecord {
    pub io: StatConfig,
    pub recovered: StatConfig,
    pub media: StatConfig,
    pub hardware: StatConfig,
    pub link: StatConfig,
    pub health_check: StatConfig,
    pub data: StatConfig,
    pub reset: StatConfig,
    pub power_cycle: StatConfig,
    /// Two errors closer than this count as a burst [ms].
    pub burst_delta_ms: u64,
    /// Weight discount inside a burst [%].
    pub burst_weight_reduce: u32,
    /// Drive class is known to be reliability challenged; its media
    /// reliability always grades as very low.
    pub reliably_challenged: bool,
    pub reset_escalation: ResetEscalation,
    pub legacy_control: LegacyControl,
}

impl ThresholdRecord {
    /// Config of `category`.
    pub const fn stat(&self, category: ErrorCategory) -> &StatConfig {
        match category {
            ErrorCategory::Io => &self.io,
            ErrorCategory::Recovered => &self.recovered,
            ErrorCategory::Media => &self.media,
            ErrorCategory::Hardware => &self.hardware,
            ErrorCategory::Link => &self.link,
            ErrorCategory::HealthCheck => &self.health_check,
            ErrorCategory::Data => &self.data,
            ErrorCategory::Reset => &self.reset,
            ErrorCategory::PowerCycle => &self.power_cycle,
        }
    }

    /// Validate every category and the burst settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for category in ErrorCategory::ALL {
            self.stat(category).validate(category)?;
        }
        if self.burst_weight_reduce > 100 {
            return Err(ConfigError::ValidationError(format!(
                "burst_weight_reduce {} exceeds 100",
                self.burst_weight_reduce
            )));
        }
        Ok(())
    }
}

impl Default for ThresholdRecord {
    /// Factory defaults for SAS drives.
    fn default() -> Self {
        use ActionKind::{EndOfLife, Fail, Reset};

        let reset_eol_fail = |reset: u32, reset_rearm: u32, eol: u32| {
            [
                ActionRule::new(reset, Some(reset_rearm), Reset),
                ActionRule::new(eol, None, EndOfLife),
                ActionRule::new(100, None, Fail),
            ]
        };

        Self {
            io: StatConfig::new(1_080_000, 3333).with_actions(reset_eol_fail(50, 10, 84)),
            recovered: StatConfig::new(1_080_000, 3600).with_actions(reset_eol_fail(50, 10, 84)),
            media: StatConfig::new(1_800_000, 18_000).with_actions(reset_eol_fail(30, 5, 50)),
            hardware: StatConfig::new(1_000_000, 36_000).with_actions(reset_eol_fail(50, 10, 89)),
            link: StatConfig::new(1000, 13).with_actions([
                ActionRule::new(50, Some(10), Reset),
                ActionRule::new(100, None, Fail),
            ]),
            health_check: StatConfig::new(200_000, 150_000)
                .with_actions([ActionRule::new(100, None, Fail)]),
            data: StatConfig::new(1_000_000, 10_000).with_actions(reset_eol_fail(50, 10, 89)),
            reset: StatConfig::new(1_000_000, 250_000).with_threshold(50),
            power_cycle: StatConfig::new(1_000_000, 500_000).with_threshold(50),
            burst_delta_ms: DEFAULT_BURST_DELTA_MS,
            burst_weight_reduce: DEFAULT_BURST_WEIGHT_REDUCE,
            reliably_challenged: true,
            reset_escalation: ResetEscalation::RuleTable,
            legacy_control: LegacyControl::default(),
        }
    }
}
