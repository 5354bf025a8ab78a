//! Boundary to the remote timetable service.

use std::future::Future;

use crate::error::TimetableResult;
use crate::payload::FetchedTimetable;

/// Something that can authenticate with an API key and return the current
/// timetable.
///
/// Implementations report network and status failures as
/// [`TimetableError::Transport`](crate::TimetableError::Transport), rejected
/// or missing auth cookies as [`TimetableError::Auth`](crate::TimetableError::Auth),
/// and undecodable payloads as
/// [`TimetableError::SchemaDrift`](crate::TimetableError::SchemaDrift).
pub trait TimetableSource {
    fn fetch(&self, api_key: &str) -> impl Future<Output = TimetableResult<FetchedTimetable>> + Send;
}
