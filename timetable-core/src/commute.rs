//! Commute durations per building and the travel windows around a study day.

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::normalize::{Building, CompactEntry};

/// Travel time to a building and back home, as `HH:MM` strings.
///
/// An empty string means no travel time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuteTime {
    #[serde(default)]
    pub forwards: String,
    #[serde(default)]
    pub backwards: String,
}

impl CommuteTime {
    pub fn new(forwards: impl Into<String>, backwards: impl Into<String>) -> Self {
        CommuteTime {
            forwards: forwards.into(),
            backwards: backwards.into(),
        }
    }

    pub fn forward_duration(&self) -> TimetableResult<TimeDelta> {
        parse_duration(&self.forwards)
    }

    pub fn backward_duration(&self) -> TimetableResult<TimeDelta> {
        parse_duration(&self.backwards)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuteConfig {
    #[serde(rename = "OP", default)]
    pub op: CommuteTime,
    #[serde(rename = "A", default)]
    pub a: CommuteTime,
}

impl CommuteConfig {
    pub fn for_building(&self, building: Building) -> &CommuteTime {
        match building {
            Building::Op => &self.op,
            Building::A => &self.a,
        }
    }

    pub fn for_building_mut(&mut self, building: Building) -> &mut CommuteTime {
        match building {
            Building::Op => &mut self.op,
            Building::A => &mut self.a,
        }
    }

    /// Check that every configured duration parses.
    pub fn validate(&self) -> TimetableResult<()> {
        for building in [Building::Op, Building::A] {
            let commute = self.for_building(building);
            commute.forward_duration()?;
            commute.backward_duration()?;
        }
        Ok(())
    }
}

/// A span of wall-clock time on the day of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommuteWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Travel before the first class and after the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommuteWindows {
    pub outbound: CommuteWindow,
    pub inbound: CommuteWindow,
}

impl CommuteWindows {
    /// Times wrap around midnight without moving to another day.
    pub fn around(entry: &CompactEntry, commute: &CommuteTime) -> TimetableResult<Self> {
        let forward = commute.forward_duration()?;
        let backward = commute.backward_duration()?;

        Ok(CommuteWindows {
            outbound: CommuteWindow {
                start: entry.time_start - forward,
                end: entry.time_start,
            },
            inbound: CommuteWindow {
                start: entry.time_end,
                end: entry.time_end + backward,
            },
        })
    }
}

/// Parse `H:MM` or `H:MM:SS`. An empty string is a zero duration.
pub fn parse_duration(s: &str) -> TimetableResult<TimeDelta> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(TimeDelta::zero());
    }

    let invalid = || TimetableError::Config(format!("Invalid duration '{s}'. Expected HH:MM"));

    let parts: Vec<&str> = s.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }

    let mut fields = parts.iter().map(|p| p.parse::<u32>().map_err(|_| invalid()));
    let hours = fields.next().ok_or_else(invalid)??;
    let minutes = fields.next().ok_or_else(invalid)??;
    let seconds = fields.next().transpose()?.unwrap_or(0);

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(TimeDelta::hours(i64::from(hours))
        + TimeDelta::minutes(i64::from(minutes))
        + TimeDelta::seconds(i64::from(seconds)))
}
