//! Compaction of the raw timetable into one entry per study day.

use std::fmt;

use chrono::{NaiveTime, Weekday};

use crate::constants::OP_BUILDING_MARKER;
use crate::payload::{Parity, RawDayEntry};

/// Campus building a day's classes take place in.
///
/// Only two buildings are told apart; any room without the OP marker counts as A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Building {
    Op,
    #[default]
    A,
}

impl Building {
    pub fn classify(room: Option<&str>) -> Self {
        match room {
            Some(room) if room.contains(OP_BUILDING_MARKER) => Building::Op,
            _ => Building::A,
        }
    }

    /// Label used in note titles.
    pub fn label(self) -> &'static str {
        match self {
            Building::Op => "ОП",
            Building::A => "А",
        }
    }

    /// Key used in the settings file.
    pub fn key(self) -> &'static str {
        match self {
            Building::Op => "OP",
            Building::A => "A",
        }
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A study day reduced to the span of its classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactEntry {
    pub day: Weekday,
    pub parity: Parity,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub building: Building,
}

impl CompactEntry {
    /// Reduce a day entry. Returns `None` when the day has no classes.
    pub fn from_day(entry: &RawDayEntry) -> Option<Self> {
        let lessons = || entry.lessons.values();

        let time_start = lessons().find_map(|l| l.time_start)?;
        let time_end = lessons().rev().find_map(|l| l.time_end)?;
        // The first slot whose leading audience entry is a room decides, even
        // when that room lacks the OP marker and a later slot has it.
        let building = Building::classify(lessons().find_map(|l| l.room()));

        Some(CompactEntry {
            day: entry.day,
            parity: entry.parity,
            time_start,
            time_end,
            building,
        })
    }
}

/// Compact every day of the timetable, dropping days without classes.
pub fn normalize(timetable: &[RawDayEntry]) -> Vec<CompactEntry> {
    let compact: Vec<CompactEntry> = timetable.iter().filter_map(CompactEntry::from_day).collect();

    tracing::debug!(
        raw = timetable.len(),
        compact = compact.len(),
        "normalized timetable"
    );

    compact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::RawLesson;
    use std::collections::BTreeMap;

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn lesson(start: Option<&str>, end: Option<&str>, room: Option<&str>) -> RawLesson {
        RawLesson {
            audience: room.map(|r| vec![r.to_string()]).unwrap_or_default(),
            discipline: vec![],
            teacher: vec![],
            time_start: start.map(time),
            time_end: end.map(time),
            kind: None,
            number: 0,
        }
    }

    fn day(day: Weekday, parity: Parity, lessons: Vec<(u32, RawLesson)>) -> RawDayEntry {
        RawDayEntry {
            day,
            parity,
            lessons: lessons.into_iter().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_first_start_and_last_end_in_slot_order() {
        let entry = day(
            Weekday::Mon,
            Parity::Odd,
            vec![
                (1, lesson(None, None, None)),
                (2, lesson(Some("10:40"), Some("12:15"), Some("А-201"))),
                (3, lesson(Some("12:40"), Some("14:15"), Some("А-202"))),
                (5, lesson(Some("16:20"), Some("17:55"), Some("А-203"))),
                (6, lesson(None, None, None)),
            ],
        );

        let compact = normalize(&[entry]);
        assert_eq!(compact.len(), 1);
        assert_eq!(compact[0].time_start, time("10:40"));
        assert_eq!(compact[0].time_end, time("17:55"));
        assert_eq!(compact[0].day, Weekday::Mon);
        assert_eq!(compact[0].parity, Parity::Odd);
    }

    #[test]
    fn test_start_and_end_may_come_from_different_slots() {
        let entry = day(
            Weekday::Wed,
            Parity::Even,
            vec![
                (1, lesson(Some("09:30"), None, None)),
                (2, lesson(None, Some("11:05"), None)),
            ],
        );

        let compact = normalize(&[entry]);
        assert_eq!(compact[0].time_start, time("09:30"));
        assert_eq!(compact[0].time_end, time("11:05"));
    }

    #[test]
    fn test_empty_days_are_dropped() {
        let timetable = vec![
            day(Weekday::Mon, Parity::Odd, vec![(1, lesson(None, None, None))]),
            day(Weekday::Tue, Parity::Odd, vec![]),
            day(Weekday::Wed, Parity::Odd, vec![(1, lesson(Some("09:30"), None, None))]),
            day(Weekday::Thu, Parity::Odd, vec![(1, lesson(None, Some("11:05"), None))]),
            day(
                Weekday::Fri,
                Parity::Odd,
                vec![(1, lesson(Some("09:30"), Some("11:05"), None))],
            ),
        ];

        let compact = normalize(&timetable);
        assert_eq!(compact.len(), 1);
        assert_eq!(compact[0].day, Weekday::Fri);
    }

    #[test]
    fn test_building_classification() {
        assert_eq!(Building::classify(Some("ОП-301")), Building::Op);
        assert_eq!(Building::classify(Some("А-201")), Building::A);
        assert_eq!(Building::classify(None), Building::A);
    }

    #[test]
    fn test_building_uses_first_populated_room() {
        let entry = day(
            Weekday::Thu,
            Parity::Odd,
            vec![
                (1, lesson(None, None, None)),
                (2, lesson(Some("10:40"), Some("12:15"), Some("ОП-301"))),
                (3, lesson(Some("12:40"), Some("14:15"), Some("А-202"))),
            ],
        );
        assert_eq!(normalize(&[entry])[0].building, Building::Op);
    }

    #[test]
    fn test_building_defaults_to_a_without_rooms() {
        let entry = day(
            Weekday::Sat,
            Parity::Even,
            vec![(3, lesson(Some("12:40"), Some("14:15"), None))],
        );
        assert_eq!(normalize(&[entry])[0].building, Building::A);
    }

    #[test]
    fn test_building_ignores_rooms_behind_a_leading_sentinel() {
        let entry: RawDayEntry = serde_json::from_value(serde_json::json!({
            "day": 1,
            "parity": 1,
            "lessons": {
                "1": {
                    "audience": ["--", "ОП-301"],
                    "time_start": "09:30",
                    "time_end": "11:05"
                },
                "2": {
                    "audience": ["А-201"],
                    "time_start": "11:20",
                    "time_end": "12:55"
                }
            }
        }))
        .unwrap();

        assert_eq!(normalize(&[entry])[0].building, Building::A);
    }

    #[test]
    fn test_building_stops_at_empty_first_room() {
        let entry = day(
            Weekday::Tue,
            Parity::Odd,
            vec![
                (1, lesson(Some("09:30"), Some("11:05"), Some(""))),
                (2, lesson(Some("11:20"), Some("12:55"), Some("ОП-301"))),
            ],
        );
        assert_eq!(normalize(&[entry])[0].building, Building::A);
    }
}
