//! Trace replay against one simulated drive.

use std::io::{BufRead, Write};

use serde::Serialize;
use tracing::{debug, info};

use dieh_common::dieh::category::{DiehState, DriveErrorState};
use dieh_common::dieh::config::ThresholdRecord;
use dieh_common::dieh::flags::ActionFlags;
use dieh_engine::classify::handle_io_error;
use dieh_engine::lifecycle::{
    apply_media_threshold, clear_drive, init_drive, reactivate_drive, reset_completed,
};
use dieh_engine::report::DiehReport;

use crate::error::ReplayError;
use crate::trace::{Step, error_event, media_command, parse_line};

/// Result of one replayed step, written as one JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub line: usize,
    pub step: &'static str,
    /// Action flag names, after call-home de-duplication.
    pub actions: Vec<&'static str>,
    /// `false` when a media threshold command was ignored.
    pub applied: bool,
    pub report: DiehReport,
}

/// Totals of a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub errors: usize,
    /// Union of every action requested during the replay.
    pub actions: ActionFlags,
}

/// One drive driven by trace steps.
#[derive(Debug)]
pub struct Replayer {
    record: ThresholdRecord,
    dieh: DiehState,
    drive: DriveErrorState,
    now_ms: u64,
}

impl Replayer {
    pub fn new(record: ThresholdRecord) -> Self {
        let mut drive = DriveErrorState::default();
        init_drive(&mut drive);
        Self {
            record,
            dieh: DiehState::new(),
            drive,
            now_ms: 0,
        }
    }

    pub fn drive(&self) -> &DriveErrorState {
        &self.drive
    }

    pub fn dieh(&self) -> &DiehState {
        &self.dieh
    }

    /// Apply one step and report the drive afterwards.
    pub fn apply(&mut self, line: usize, step: &Step) -> Result<StepOutcome, ReplayError> {
        let mut actions = ActionFlags::NO_ACTION;
        let mut applied = true;

        match step {
            Step::Success { count } => self.drive.record_successes(*count),
            Step::Error { at_ms, .. } => {
                if let Some(at_ms) = at_ms {
                    self.now_ms = *at_ms;
                }
                if let Some(event) = error_event(line, step)? {
                    let event = event.emeh(self.dieh.is_emeh());
                    let raw = handle_io_error(
                        Some(&self.record),
                        &mut self.dieh,
                        &mut self.drive,
                        &event,
                        self.now_ms,
                    )
                    .map_err(|source| ReplayError::Engine { line, source })?;
                    actions = self.dieh.filter_call_home(raw);
                }
            }
            Step::ResetCompleted => {
                reset_completed(Some(&self.record), &mut self.drive)
                    .map_err(|source| ReplayError::Engine { line, source })?;
            }
            Step::Clear => clear_drive(&mut self.drive),
            Step::MediaThreshold { cmd, percent } => {
                applied =
                    apply_media_threshold(&mut self.dieh, &mut self.drive, media_command(*cmd, *percent));
            }
            Step::Reactivate => reactivate_drive(&self.record, &mut self.dieh, &self.drive),
        }

        if !actions.is_empty() {
            info!(line, ?actions, "actions requested");
        }

        Ok(StepOutcome {
            line,
            step: step.name(),
            actions: actions.iter_names().map(|(name, _)| name).collect(),
            applied,
            report: DiehReport::collect(&self.record, &self.drive, &self.dieh),
        })
    }

    /// Replay every step of `input`, writing one JSON line per step to `output`.
    pub fn replay<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary::default();

        for (index, text) in input.lines().enumerate() {
            let line = index + 1;
            let Some(step) = parse_line(line, &text?)? else {
                continue;
            };
            let outcome = self.apply(line, &step)?;
            debug!(line, step = outcome.step, "step replayed");

            serde_json::to_writer(&mut output, &outcome)?;
            output.write_all(b"\n")?;

            summary.steps += 1;
            if matches!(step, Step::Error { .. }) {
                summary.errors += 1;
            }
            for name in &outcome.actions {
                if let Some(flag) = ActionFlags::from_name(name) {
                    summary.actions |= flag;
                }
            }
        }

        output.flush()?;
        Ok(summary)
    }
}
