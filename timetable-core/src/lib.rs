//! Core of the MTUCI timetable sync.
//!
//! - `payload`: the raw schedule as the web API returns it
//! - `normalize`: one compact entry per study day
//! - `resolve`: calendar dates under the two-week parity cycle
//! - `commute` and `note`: the notes written for each day
//! - `sync`: the `sync_once` entry point tying it together

pub mod commute;
pub mod constants;
pub mod error;
pub mod normalize;
pub mod note;
pub mod payload;
pub mod resolve;
pub mod settings;
pub mod source;
pub mod store;
pub mod sync;

pub use error::{TimetableError, TimetableResult};
pub use normalize::{Building, CompactEntry, normalize};
pub use payload::{FetchedTimetable, Parity, RawDayEntry, RawLesson, Timetable};
pub use resolve::{ResolvedEntry, anchor_monday, resolve};
pub use settings::Settings;
pub use source::TimetableSource;
pub use store::{NoteStore, VaultStore};
pub use sync::{SyncReport, sync_once};
