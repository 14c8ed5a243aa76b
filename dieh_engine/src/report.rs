//! Per-drive ratio snapshot for diagnostics.
//!
//! Also answers the media threshold query of the RAID layer: mode, weight
//! adjustment and a media reliability grade used to decide whether extended
//! media error handling should be applied to the drive.

use serde::Serialize;

use dieh_common::dieh::category::{
    CATEGORY_COUNT, DiehState, DriveErrorState, ErrorCategory, MediaThresholdMode, TrippedActions,
};
use dieh_common::dieh::config::ThresholdRecord;

use crate::ratio::compute_ratio;

/// Current standing of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: ErrorCategory,
    pub error_tag: u64,
    /// Ratio [%]; 0 when the category is misconfigured.
    pub ratio: u32,
    pub tripped: TrippedActions,
}

// ─── Media Reliability ──────────────────────────────────────────────

/// Media reliability grade of one drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaReliability {
    /// No media or recovered error debt on a drive class in good standing.
    VeryHigh,
    /// Media or recovered error debt present.
    Low,
    /// Drive class flagged reliability challenged, or no threshold record.
    VeryLow,
}

/// Grade the media reliability of `drive`.
///
/// A missing record grades as [`MediaReliability::VeryLow`]. A category that
/// cannot produce a ratio counts as ratio 0.
pub fn media_reliability(
    record: Option<&ThresholdRecord>,
    drive: &DriveErrorState,
) -> MediaReliability {
    let Some(record) = record else {
        return MediaReliability::VeryLow;
    };
    if record.reliably_challenged {
        return MediaReliability::VeryLow;
    }
    let ratio = |category| {
        compute_ratio(
            record.stat(category),
            category,
            drive.io_counter,
            drive.error_tag(category),
        )
        .unwrap_or(0)
    };
    if ratio(ErrorCategory::Media) > 0 || ratio(ErrorCategory::Recovered) > 0 {
        MediaReliability::Low
    } else {
        MediaReliability::VeryHigh
    }
}

// ─── Report ─────────────────────────────────────────────────────────

/// Snapshot of every category plus the media threshold state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiehReport {
    pub io_counter: u64,
    pub mode: MediaThresholdMode,
    pub media_weight_adjust: u32,
    pub reliability: MediaReliability,
    pub categories: [CategoryReport; CATEGORY_COUNT],
}

impl DiehReport {
    pub fn collect(record: &ThresholdRecord, drive: &DriveErrorState, dieh: &DiehState) -> Self {
        let categories = ErrorCategory::ALL.map(|category| {
            let error_tag = drive.error_tag(category);
            CategoryReport {
                category,
                error_tag,
                ratio: compute_ratio(record.stat(category), category, drive.io_counter, error_tag)
                    .unwrap_or(0),
                tripped: dieh.tripped(category),
            }
        });
        Self {
            io_counter: drive.io_counter,
            mode: dieh.mode,
            media_weight_adjust: dieh.media_weight_adjust,
            reliability: media_reliability(Some(record), drive),
            categories,
        }
    }

    #[inline]
    pub fn get(&self, category: ErrorCategory) -> &CategoryReport {
        &self.categories[category.index()]
    }

    /// Highest ratio across all categories.
    pub fn max_ratio(&self) -> u32 {
        self.categories.iter().map(|c| c.ratio).max().unwrap_or(0)
    }
}
