//! Calendar notes written into the vault.
//!
//! Each study day gets one note under `<path>/учёба/<date>.md`. With commute
//! generation on, it also gets `<path>/дорога/<date>-1.md` (to the building)
//! and `<path>/дорога/<date>-2.md` (back home).

use std::fmt;

use chrono::{Days, NaiveDate, NaiveTime};
use indoc::formatdoc;

use crate::commute::{CommuteConfig, CommuteWindow, CommuteWindows};
use crate::constants::{COMMUTE_FOLDER, DATE_FORMAT, STUDY_FOLDER, SYNC_WINDOW_DAYS, TIME_FORMAT};
use crate::error::TimetableResult;
use crate::resolve::ResolvedEntry;

const COMMUTE_TITLE: &str = "Дорога";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    Study,
    Outbound,
    Return,
}

impl NoteKind {
    pub const ALL: [NoteKind; 3] = [NoteKind::Study, NoteKind::Outbound, NoteKind::Return];

    fn folder(self) -> &'static str {
        match self {
            NoteKind::Study => STUDY_FOLDER,
            NoteKind::Outbound | NoteKind::Return => COMMUTE_FOLDER,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            NoteKind::Study => "",
            NoteKind::Outbound => "-1",
            NoteKind::Return => "-2",
        }
    }

    /// Vault-relative path of the note of this kind for `date`.
    pub fn path(self, root: &str, date: NaiveDate) -> String {
        format!(
            "{}/{}/{}{}.md",
            root.trim_end_matches('/'),
            self.folder(),
            date.format(DATE_FORMAT),
            self.suffix()
        )
    }
}

/// One note file: where it goes and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub kind: NoteKind,
    pub path: String,
    pub title: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Note {
    pub fn study(root: &str, resolved: &ResolvedEntry) -> Self {
        Note {
            kind: NoteKind::Study,
            path: NoteKind::Study.path(root, resolved.date),
            title: format!("Учёба ({})", resolved.entry.building.label()),
            date: resolved.date,
            start: resolved.entry.time_start,
            end: resolved.entry.time_end,
        }
    }

    fn commute(root: &str, kind: NoteKind, date: NaiveDate, window: CommuteWindow) -> Self {
        Note {
            kind,
            path: kind.path(root, date),
            title: COMMUTE_TITLE.to_string(),
            date,
            start: window.start,
            end: window.end,
        }
    }

    /// File contents: a frontmatter block and nothing else, without a trailing newline.
    pub fn to_markdown(&self) -> String {
        formatdoc! {r#"
            ---
            title: "{title}"
            allDay: false
            startTime: {start}
            endTime: {end}
            date: {date}
            completed: null
            ---"#,
            title = self.title,
            start = self.start.format(TIME_FORMAT),
            end = self.end.format(TIME_FORMAT),
            date = self.date.format(DATE_FORMAT),
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}-{}",
            self.date.format(DATE_FORMAT),
            self.title,
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

/// Every path a sync may have written for the two weeks starting at `anchor`.
pub fn window_paths(root: &str, anchor: NaiveDate) -> Vec<String> {
    (0..SYNC_WINDOW_DAYS)
        .filter_map(|i| anchor.checked_add_days(Days::new(u64::from(i))))
        .flat_map(|date| NoteKind::ALL.map(|kind| kind.path(root, date)))
        .collect()
}

/// What a sync is going to remove and write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePlan {
    pub anchor: NaiveDate,
    /// Paths cleared before writing, whether or not they exist.
    pub stale: Vec<String>,
    pub notes: Vec<Note>,
}

impl NotePlan {
    /// Build the plan. Fails only on malformed commute durations, before
    /// anything has been touched.
    pub fn build(
        root: &str,
        anchor: NaiveDate,
        resolved: &[ResolvedEntry],
        commute: Option<&CommuteConfig>,
    ) -> TimetableResult<Self> {
        let mut notes = Vec::with_capacity(resolved.len() * 3);

        for entry in resolved {
            notes.push(Note::study(root, entry));

            if let Some(config) = commute {
                let windows =
                    CommuteWindows::around(&entry.entry, config.for_building(entry.entry.building))?;
                notes.push(Note::commute(root, NoteKind::Outbound, entry.date, windows.outbound));
                notes.push(Note::commute(root, NoteKind::Return, entry.date, windows.inbound));
            }
        }

        Ok(NotePlan {
            anchor,
            stale: window_paths(root, anchor),
            notes,
        })
    }

    pub fn count(&self, kind: NoteKind) -> usize {
        self.notes.iter().filter(|n| n.kind == kind).count()
    }
}
