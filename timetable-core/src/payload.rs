//! Raw timetable payload as returned by the MTUCI web API.
//!
//! The API encodes "nothing here" as the string `--`. That sentinel is turned
//! into `None` (or dropped from lists) during deserialization, so nothing past
//! this module has to know about it. The audience list is the exception: it is
//! kept as received, because only its first entry decides the building.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{SENTINEL, TIME_FORMAT};
use crate::error::{TimetableError, TimetableResult};

/// Week parity in the school's two-week cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Parity {
    /// Parity `1`.
    Odd,
    /// Parity `2`.
    Even,
}

impl Parity {
    pub fn flipped(self) -> Self {
        match self {
            Parity::Odd => Parity::Even,
            Parity::Even => Parity::Odd,
        }
    }

    /// Zero-based week index inside the two-week cycle.
    pub fn week_index(self) -> u32 {
        match self {
            Parity::Odd => 0,
            Parity::Even => 1,
        }
    }
}

impl TryFrom<u8> for Parity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Parity::Odd),
            2 => Ok(Parity::Even),
            other => Err(format!("parity must be 1 or 2, got {other}")),
        }
    }
}

impl From<Parity> for u8 {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::Odd => 1,
            Parity::Even => 2,
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Kind of class held in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectType {
    Lecture,
    Practice,
    Lab,
}

impl SubjectType {
    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(SubjectType::Lecture),
            2 => Some(SubjectType::Practice),
            3 => Some(SubjectType::Lab),
            _ => None,
        }
    }
}

/// One period of a day. Most slots of a day are empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawLesson {
    /// Rooms exactly as the API lists them, sentinels included.
    #[serde(default, deserialize_with = "raw_string_list")]
    pub audience: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub discipline: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub teacher: Vec<String>,

    #[serde(deserialize_with = "optional_time")]
    pub time_start: Option<NaiveTime>,

    #[serde(deserialize_with = "optional_time")]
    pub time_end: Option<NaiveTime>,

    #[serde(default, rename = "type", deserialize_with = "subject_type")]
    pub kind: Option<SubjectType>,

    #[serde(default)]
    pub number: u32,
}

impl RawLesson {
    /// First audience string of the slot, unless it is the `--` sentinel.
    ///
    /// Later entries are never consulted, and an empty first entry still
    /// counts as a room.
    pub fn room(&self) -> Option<&str> {
        self.audience
            .first()
            .map(String::as_str)
            .filter(|room| room.trim() != SENTINEL)
    }
}

/// All slots for one weekday of one parity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDayEntry {
    #[serde(deserialize_with = "day_of_week")]
    pub day: Weekday,

    pub parity: Parity,

    /// Lessons keyed by slot number, iterated in ascending slot order.
    #[serde(default, deserialize_with = "slots")]
    pub lessons: BTreeMap<u32, RawLesson>,
}

pub type Timetable = Vec<RawDayEntry>;

/// Result of one authenticated fetch: the timetable and the parity the API
/// reports for the current week.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTimetable {
    pub timetable: Timetable,
    pub current_parity: Parity,
}

#[derive(Deserialize)]
struct Envelope {
    content: EnvelopeContent,
}

#[derive(Deserialize)]
struct EnvelopeContent {
    parity: Parity,
    timetable: TimetableEnvelope,
}

#[derive(Deserialize)]
struct TimetableEnvelope {
    content: TimetableContent,
}

#[derive(Deserialize)]
struct TimetableContent {
    timetable: Timetable,
}

impl FetchedTimetable {
    /// Decode the body of `api/web/get`.
    pub fn from_json(body: &str) -> TimetableResult<Self> {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| TimetableError::SchemaDrift(e.to_string()))?;
        Ok(envelope.into())
    }

    pub fn from_value(value: Value) -> TimetableResult<Self> {
        let envelope: Envelope =
            serde_json::from_value(value).map_err(|e| TimetableError::SchemaDrift(e.to_string()))?;
        Ok(envelope.into())
    }

    /// The API flags the second week of its cycle with parity `2`; entries
    /// then have to be read with their parity inverted.
    pub fn current_week_is_parity_2(&self) -> bool {
        self.current_parity == Parity::Even
    }
}

impl From<Envelope> for FetchedTimetable {
    fn from(envelope: Envelope) -> Self {
        FetchedTimetable {
            timetable: envelope.content.timetable.content.timetable,
            current_parity: envelope.content.parity,
        }
    }
}

// =============================================================================
// Field decoders
// =============================================================================

fn is_sentinel(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s == SENTINEL
}

fn optional_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(s) if !is_sentinel(&s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid lesson time '{s}'"))),
        _ => Ok(None),
    }
}

/// Accepts either a single string or a list and drops sentinel entries.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = raw_string_list(deserializer)?;
    Ok(values.into_iter().filter(|s| !is_sentinel(s)).collect())
}

/// Accepts either a single string or a list, keeping every entry.
fn raw_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(D::Error::custom(format!("expected string, found {other}"))),
            })
            .collect::<Result<Vec<String>, D::Error>>()?,
        other => return Err(D::Error::custom(format!("expected string list, found {other}"))),
    };

    Ok(values)
}

/// Unknown or missing codes are kept as `None`; empty slots carry arbitrary values here.
fn subject_type<'de, D>(deserializer: D) -> Result<Option<SubjectType>, D::Error>
where
    D: Deserializer<'de>,
{
    let code = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(code.and_then(SubjectType::from_code))
}

fn day_of_week<'de, D>(deserializer: D) -> Result<Weekday, D::Error>
where
    D: Deserializer<'de>,
{
    let day = u8::deserialize(deserializer)?;
    if !(1..=7).contains(&day) {
        return Err(D::Error::custom(format!("day must be within 1..=7, got {day}")));
    }
    Weekday::try_from(day - 1).map_err(|_| D::Error::custom(format!("invalid day {day}")))
}

/// Lessons arrive as an object keyed by slot number; a plain array is
/// accepted too and numbered from 1.
fn slots<'de, D>(deserializer: D) -> Result<BTreeMap<u32, RawLesson>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(BTreeMap::new()),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, lesson)| {
                let slot = key
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| D::Error::custom(format!("lesson slot '{key}' is not a number")))?;
                let lesson = RawLesson::deserialize(lesson).map_err(D::Error::custom)?;
                Ok((slot, lesson))
            })
            .collect(),
        Value::Array(list) => list
            .into_iter()
            .zip(1u32..)
            .map(|(lesson, slot)| {
                let lesson = RawLesson::deserialize(lesson).map_err(D::Error::custom)?;
                Ok((slot, lesson))
            })
            .collect(),
        other => Err(D::Error::custom(format!("expected lesson map, found {other}"))),
    }
}
