//! Mapping of compact entries onto calendar dates in the two-week window.

use chrono::{Days, NaiveDate};

use crate::constants::DATE_FORMAT;
use crate::error::{TimetableError, TimetableResult};
use crate::normalize::CompactEntry;
use crate::payload::Parity;

/// A compact entry pinned to a concrete date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub entry: CompactEntry,
    /// Parity after applying the current-week flip.
    pub effective_parity: Parity,
    pub date: NaiveDate,
}

impl ResolvedEntry {
    /// Date in `YYYY-MM-DD` form, as used in note names and frontmatter.
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Monday of the week containing `today`. Weeks always start on Monday.
pub fn anchor_monday(today: NaiveDate) -> NaiveDate {
    today.week(chrono::Weekday::Mon).first_day()
}

/// Days between the anchor Monday and the entry's date.
///
/// Parity-1 entries land on days 0..=6, parity-2 entries on days 7..=13.
pub fn day_offset(entry: &CompactEntry, effective_parity: Parity) -> u64 {
    u64::from(entry.day.num_days_from_monday()) + u64::from(effective_parity.week_index()) * 7
}

/// Give every entry its date relative to `anchor_monday`.
///
/// When the API says the current week is parity 2, each entry's parity is
/// inverted before placing it, so the current week is always days 0..=6.
pub fn resolve(
    entries: &[CompactEntry],
    anchor_monday: NaiveDate,
    current_week_is_parity_2: bool,
) -> TimetableResult<Vec<ResolvedEntry>> {
    entries
        .iter()
        .map(|entry| {
            let effective_parity = if current_week_is_parity_2 {
                entry.parity.flipped()
            } else {
                entry.parity
            };

            let offset = day_offset(entry, effective_parity);
            let date = anchor_monday
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| {
                    TimetableError::DateOutOfRange(format!("{anchor_monday} + {offset} days"))
                })?;

            Ok(ResolvedEntry {
                entry: *entry,
                effective_parity,
                date,
            })
        })
        .collect()
}
