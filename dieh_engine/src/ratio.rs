//! Decaying error-tag ratio model.
//!
//! Each category keeps an error tag measured in I/O counts. The tag trails
//! `io_counter`; the closer it is, the more error debt the drive carries
//! within the category window. Three regions, evaluated identically by
//! [`apply_error`] and [`compute_ratio`]:
//!
//! - **Stale** (`tag + 2·interval < io`): no recent history, ratio 0.
//! - **Transitional** (`tag < io − interval + weight`): linear smoothing
//!   across the `2·interval` boundary so the ratio has no step.
//! - **Active**: `ratio = 100 − (100 / interval)·(io − tag)`.
//!
//! Window bounds are computed in `i128` so `io_counter < 2·interval` cannot
//! wrap. Division and scaling use `f64` and truncate toward zero; the
//! truncation is part of the contract and golden tests depend on it.
//!
//! ## RT Safety
//!
//! Zero-allocation, O(1), no locking.

use tracing::warn;

use dieh_common::consts::RATIO_MAX;
use dieh_common::dieh::category::ErrorCategory;
use dieh_common::dieh::config::StatConfig;
use dieh_common::dieh::error::DiehError;

/// Region of the sliding window an error tag falls into.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Window {
    Stale,
    /// `weight_ratio` = position inside the smoothing band, in `[0, 1)`.
    Transitional { weight_ratio: f64 },
    Active,
}

impl Window {
    #[inline]
    fn locate(interval: i128, weight: i128, io: i128, tag: i128) -> Self {
        if tag + 2 * interval < io {
            Self::Stale
        } else if tag < io - interval + weight {
            let diff = tag - (io - 2 * interval);
            Self::Transitional {
                weight_ratio: diff as f64 / (interval + weight) as f64,
            }
        } else {
            Self::Active
        }
    }
}

#[inline]
fn checked_interval(cfg: &StatConfig, category: ErrorCategory) -> Result<i128, DiehError> {
    if cfg.interval == 0 {
        let err = DiehError::ZeroInterval { category };
        warn!(%err, "ratio unavailable");
        return Err(err);
    }
    Ok(cfg.interval as i128)
}

/// Charge `effective_weight` to an error tag and return the new tag.
///
/// Stale history is discarded (the tag snaps to one interval behind the
/// counter) and the result never exceeds `io_counter`.
pub fn apply_error(
    cfg: &StatConfig,
    category: ErrorCategory,
    io_counter: u64,
    error_tag: u64,
    effective_weight: u64,
) -> Result<u64, DiehError> {
    let interval = checked_interval(cfg, category)?;
    let io = io_counter as i128;
    let weight = cfg.weight as i128;
    let mut tag = error_tag as i128;

    match Window::locate(interval, weight, io, tag) {
        Window::Stale => tag = io - interval,
        Window::Transitional { weight_ratio } => {
            let historical_shift = (weight as f64 * weight_ratio) as i128;
            tag = io - interval + historical_shift;
        }
        Window::Active => {}
    }

    tag += effective_weight as i128;
    Ok(tag.clamp(0, io) as u64)
}

/// Saturation of a category window in percent, `0..=100`.
pub fn compute_ratio(
    cfg: &StatConfig,
    category: ErrorCategory,
    io_counter: u64,
    error_tag: u64,
) -> Result<u32, DiehError> {
    let interval = checked_interval(cfg, category)?;
    let io = io_counter as i128;
    let weight = cfg.weight as i128;
    let tag = error_tag as i128;
    let interval_f = interval as f64;

    let ratio = match Window::locate(interval, weight, io, tag) {
        Window::Stale => 0.0,
        Window::Transitional { weight_ratio } => {
            100.0 * (weight as f64 / interval_f) * weight_ratio
        }
        Window::Active => 100.0 - (100.0 / interval_f) * (io - tag) as f64,
    };

    Ok(ratio.clamp(0.0, RATIO_MAX as f64) as u32)
}
