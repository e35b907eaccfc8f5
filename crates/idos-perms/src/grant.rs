//! Grant evaluation.
//!
//! A grant is usable by its grantee once its time-lock has passed. Grants are
//! read from the store as immutable values; revoking one is a delete in the
//! store, not a change to the value.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};

use idos_core::Grant;

use crate::error::{PermsError, Result};

/// Text shown for a grant without a time-lock.
pub const UNLOCKED: &str = "Unlocked";

/// Whether `grant` is usable at `now` (Unix seconds).
///
/// The deadline is inclusive: a grant locked until `t` is usable at `t`.
pub fn is_usable(grant: &Grant, now: u64) -> bool {
    grant.locked_until == 0 || grant.locked_until <= now
}

/// Human-readable lock status.
///
/// `"Unlocked"` for a grant without a time-lock, otherwise the deadline
/// rendered with `display`.
pub fn describe_lock(grant: &Grant, _now: u64, display: &LockDisplay) -> String {
    if grant.locked_until == 0 {
        return UNLOCKED.to_string();
    }
    display.render(grant.locked_until)
}

/// Timezone and format used to render lock deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockDisplay {
    utc_offset_seconds: i32,
    format: String,
}

impl LockDisplay {
    /// Full weekday and date followed by a short 12-hour time.
    pub const DEFAULT_FORMAT: &'static str = "%A, %B %-d, %Y at %-I:%M %p";

    /// Create a display policy, validating the offset and format string.
    pub fn new(utc_offset_seconds: i32, format: impl Into<String>) -> Result<Self> {
        let format = format.into();

        if FixedOffset::east_opt(utc_offset_seconds).is_none() {
            return Err(PermsError::InvalidLockFormat(format!(
                "utc offset out of range: {utc_offset_seconds}"
            )));
        }
        if format.is_empty() || StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(PermsError::InvalidLockFormat(format));
        }

        Ok(Self {
            utc_offset_seconds,
            format,
        })
    }

    /// UTC with the default format.
    pub fn utc() -> Self {
        Self {
            utc_offset_seconds: 0,
            format: Self::DEFAULT_FORMAT.to_string(),
        }
    }

    pub fn utc_offset_seconds(&self) -> i32 {
        self.utc_offset_seconds
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Render a Unix-seconds timestamp.
    ///
    /// Timestamps outside the calendar range fall back to the raw number.
    pub fn render(&self, unix_seconds: u64) -> String {
        let offset = FixedOffset::east_opt(self.utc_offset_seconds);
        let datetime = i64::try_from(unix_seconds)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        match (datetime, offset) {
            (Some(dt), Some(offset)) => dt.with_timezone(&offset).format(&self.format).to_string(),
            _ => format!("{unix_seconds} (unix)"),
        }
    }
}

impl Default for LockDisplay {
    fn default() -> Self {
        Self::utc()
    }
}
