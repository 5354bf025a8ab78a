//! One sync cycle: fetch, normalize, resolve, then replace the notes of the
//! current and next week.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::TimetableResult;
use crate::normalize::normalize;
use crate::note::{NoteKind, NotePlan};
use crate::payload::{FetchedTimetable, Parity};
use crate::resolve::{anchor_monday, resolve};
use crate::settings::Settings;
use crate::source::TimetableSource;
use crate::store::NoteStore;

/// A computed plan together with what the API said about the current week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSync {
    pub current_parity: Parity,
    pub plan: NotePlan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub current_parity: Parity,
    pub plan: NotePlan,
    pub deleted: usize,
    pub created: usize,
}

impl SyncReport {
    pub fn study_days(&self) -> usize {
        self.plan.count(NoteKind::Study)
    }

    pub fn commute_notes(&self) -> usize {
        self.plan.count(NoteKind::Outbound) + self.plan.count(NoteKind::Return)
    }
}

/// Turn a fetched timetable into the notes for the two weeks starting on
/// the Monday of `today`'s week.
pub fn prepare(
    settings: &Settings,
    fetched: &FetchedTimetable,
    today: NaiveDate,
) -> TimetableResult<PreparedSync> {
    let anchor = anchor_monday(today);
    let compact = normalize(&fetched.timetable);
    debug!(?compact, "compact timetable");

    let resolved = resolve(&compact, anchor, fetched.current_week_is_parity_2())?;
    let plan = NotePlan::build(&settings.path, anchor, &resolved, settings.commute_if_enabled())?;

    Ok(PreparedSync {
        current_parity: fetched.current_parity,
        plan,
    })
}

/// Fetch and prepare without touching any notes.
pub async fn plan_once<S: TimetableSource>(
    settings: &Settings,
    source: &S,
    today: NaiveDate,
) -> TimetableResult<PreparedSync> {
    let api_key = settings.require_api_key()?;
    let fetched = source.fetch(api_key).await?;
    debug!(
        days = fetched.timetable.len(),
        parity = %fetched.current_parity,
        "fetched timetable"
    );

    prepare(settings, &fetched, today)
}

/// Remove every note in the plan's window, then write the planned notes.
///
/// Not transactional: an error midway leaves the window partially updated.
pub fn apply<N: NoteStore>(plan: &NotePlan, store: &mut N) -> TimetableResult<(usize, usize)> {
    let mut deleted = 0;
    for path in &plan.stale {
        if store.exists(path) {
            store.delete(path)?;
            deleted += 1;
        }
    }

    for note in &plan.notes {
        store.create(&note.path, &note.to_markdown())?;
    }

    Ok((deleted, plan.notes.len()))
}

/// Run a full sync cycle. Fetch and settings failures are returned
/// before the store is touched.
pub async fn sync_once<S: TimetableSource, N: NoteStore>(
    settings: &Settings,
    source: &S,
    store: &mut N,
    today: NaiveDate,
) -> TimetableResult<SyncReport> {
    let PreparedSync {
        current_parity,
        plan,
    } = plan_once(settings, source, today).await?;

    let (deleted, created) = apply(&plan, store)?;

    info!(
        anchor = %plan.anchor,
        parity = %current_parity,
        deleted,
        created,
        "timetable synced"
    );

    Ok(SyncReport {
        current_parity,
        plan,
        deleted,
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commute::CommuteTime;
    use crate::error::TimetableError;
    use crate::store::memory::MemoryStore;
    use serde_json::{Value, json};

    const ROOT: &str = "календарь/мтуси";

    enum FakeSource {
        Payload(Value),
        Offline,
    }

    impl TimetableSource for FakeSource {
        async fn fetch(&self, api_key: &str) -> TimetableResult<FetchedTimetable> {
            assert_eq!(api_key, "token");
            match self {
                FakeSource::Payload(value) => FetchedTimetable::from_value(value.clone()),
                FakeSource::Offline => Err(TimetableError::Transport("connection refused".into())),
            }
        }
    }

    fn lesson(start: &str, end: &str, audience: &str) -> Value {
        json!({
            "audience": [audience],
            "discipline": ["--"],
            "number": 0,
            "teacher": ["--"],
            "time_start": start,
            "time_end": end,
            "type": 0
        })
    }

    fn study_day(day: u8, parity: u8, audience: &str) -> Value {
        json!({
            "day": day,
            "parity": parity,
            "lessons": {
                "1": lesson("--", "--", "--"),
                "2": lesson("10:40", "12:15", audience),
                "3": lesson("12:40", "14:15", audience),
                "4": lesson("--", "--", "--")
            }
        })
    }

    fn empty_day(day: u8, parity: u8) -> Value {
        json!({
            "day": day,
            "parity": parity,
            "lessons": {
                "1": lesson("--", "--", "--"),
                "2": lesson("--", "--", "--")
            }
        })
    }

    /// Mon..Fri for both parities, Wednesday of each week without classes.
    fn two_week_payload(current_parity: u8) -> Value {
        let mut days = Vec::new();
        for parity in [1, 2] {
            for day in 1..=5 {
                if day == 3 {
                    days.push(empty_day(day, parity));
                } else {
                    let audience = if parity == 1 { "ОП-301" } else { "А-201" };
                    days.push(study_day(day, parity, audience));
                }
            }
        }

        json!({
            "content": {
                "parity": current_parity,
                "timetable": { "content": { "timetable": days } }
            }
        })
    }

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.api_key = "token".into();
        settings.commute.op = CommuteTime::new("00:45", "00:50");
        settings.commute.a = CommuteTime::new("01:00", "01:05");
        settings
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_two_weeks_with_empty_days() {
        let source = FakeSource::Payload(two_week_payload(1));
        let mut store = MemoryStore::default();

        let report = sync_once(&settings(), &source, &mut store, date("2024-06-05"))
            .await
            .unwrap();

        // 10 weekday entries with one empty day per week leaves 8 study days
        assert_eq!(report.study_days(), 8);
        assert_eq!(report.commute_notes(), 16);
        assert_eq!(store.files.len(), 24);
        assert_eq!(report.plan.anchor, date("2024-06-03"));

        let monday = &store.files["календарь/мтуси/учёба/2024-06-03.md"];
        assert!(monday.contains("title: \"Учёба (ОП)\""));
        assert!(monday.contains("startTime: 10:40\nendTime: 14:15\n"));

        let next_monday = &store.files["календарь/мтуси/учёба/2024-06-10.md"];
        assert!(next_monday.contains("title: \"Учёба (А)\""));

        let outbound = &store.files["календарь/мтуси/дорога/2024-06-10-1.md"];
        assert!(outbound.contains("startTime: 09:40\nendTime: 10:40\n"));

        assert!(!store.files.contains_key("календарь/мтуси/учёба/2024-06-05.md"));
        assert!(!store.files.contains_key("календарь/мтуси/учёба/2024-06-12.md"));
    }

    #[tokio::test]
    async fn test_nine_study_days_and_eighteen_commutes() {
        let mut payload = two_week_payload(1);
        // give the second week's Wednesday classes back
        payload["content"]["timetable"]["content"]["timetable"][7] = study_day(3, 2, "А-105");

        let source = FakeSource::Payload(payload);
        let mut store = MemoryStore::default();
        let report = sync_once(&settings(), &source, &mut store, date("2024-06-03"))
            .await
            .unwrap();

        assert_eq!(report.study_days(), 9);
        assert_eq!(report.commute_notes(), 18);
        assert!(store.files.contains_key("календарь/мтуси/учёба/2024-06-12.md"));
    }

    #[tokio::test]
    async fn test_parity_two_swaps_weeks() {
        let source = FakeSource::Payload(two_week_payload(2));
        let mut store = MemoryStore::default();

        let report = sync_once(&settings(), &source, &mut store, date("2024-06-03"))
            .await
            .unwrap();
        assert_eq!(report.current_parity, Parity::Even);

        // parity-2 entries (building A) now fall into the current week
        let monday = &store.files["календарь/мтуси/учёба/2024-06-03.md"];
        assert!(monday.contains("title: \"Учёба (А)\""));
        let next_monday = &store.files["календарь/мтуси/учёба/2024-06-10.md"];
        assert!(next_monday.contains("title: \"Учёба (ОП)\""));
    }

    #[tokio::test]
    async fn test_commute_disabled() {
        let mut settings = settings();
        settings.generate_commute = false;

        let source = FakeSource::Payload(two_week_payload(1));
        let mut store = MemoryStore::default();
        let report = sync_once(&settings, &source, &mut store, date("2024-06-03"))
            .await
            .unwrap();

        assert_eq!(report.commute_notes(), 0);
        assert!(store.files.keys().all(|p| p.contains("/учёба/")));
    }

    #[tokio::test]
    async fn test_stale_notes_in_window_are_replaced() {
        let mut store = MemoryStore::default();
        let in_window = format!("{ROOT}/учёба/2024-06-05.md");
        let commute_in_window = format!("{ROOT}/дорога/2024-06-12-2.md");
        let outside = format!("{ROOT}/учёба/2024-06-17.md");
        let unrelated = format!("{ROOT}/учёба/notes.md");
        for path in [&in_window, &commute_in_window, &outside, &unrelated] {
            store.files.insert(path.clone(), "old".into());
        }

        let source = FakeSource::Payload(two_week_payload(1));
        let report = sync_once(&settings(), &source, &mut store, date("2024-06-03"))
            .await
            .unwrap();

        assert_eq!(report.deleted, 2);
        assert!(!store.files.contains_key(&in_window));
        assert!(!store.files.contains_key(&commute_in_window));
        assert_eq!(store.files[&outside], "old");
        assert_eq!(store.files[&unrelated], "old");
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_notes_untouched() {
        let mut store = MemoryStore::default();
        store
            .files
            .insert(format!("{ROOT}/учёба/2024-06-03.md"), "old".into());

        let result = sync_once(&settings(), &FakeSource::Offline, &mut store, date("2024-06-03")).await;

        assert!(matches!(result, Err(TimetableError::Transport(_))));
        assert!(store.deleted.is_empty());
        assert_eq!(store.files.len(), 1);
    }

    #[tokio::test]
    async fn test_schema_drift_leaves_notes_untouched() {
        let payload = json!({
            "content": {
                "parity": 1,
                "timetable": { "content": { "timetable": [{ "day": 9, "parity": 1, "lessons": {} }] } }
            }
        });
        let mut store = MemoryStore::default();
        store
            .files
            .insert(format!("{ROOT}/учёба/2024-06-03.md"), "old".into());

        let result = sync_once(
            &settings(),
            &FakeSource::Payload(payload),
            &mut store,
            date("2024-06-03"),
        )
        .await;

        assert!(matches!(result, Err(TimetableError::SchemaDrift(_))));
        assert!(store.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_bad_commute_duration_fails_before_mutation() {
        let mut settings = settings();
        settings.commute.op = CommuteTime::new("three quarters", "");

        let mut store = MemoryStore::default();
        store
            .files
            .insert(format!("{ROOT}/учёба/2024-06-03.md"), "old".into());

        let result = sync_once(
            &settings,
            &FakeSource::Payload(two_week_payload(1)),
            &mut store,
            date("2024-06-03"),
        )
        .await;

        assert!(matches!(result, Err(TimetableError::Config(_))));
        assert!(store.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let mut settings = settings();
        settings.api_key.clear();

        let result = plan_once(&settings, &FakeSource::Offline, date("2024-06-03")).await;
        assert!(matches!(result, Err(TimetableError::Config(_))));
    }
}
