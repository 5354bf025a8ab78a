/// Marker that appears in an audience string when the room is in the OP building.
pub const OP_BUILDING_MARKER: &str = "ОП";

/// Placeholder the remote API uses for "no value" in lesson fields.
pub const SENTINEL: &str = "--";

/// Default vault-relative folder that holds the generated notes.
pub const DEFAULT_NOTES_PATH: &str = "календарь/мтуси";

/// Default vault root, tilde-expanded at load time.
pub const DEFAULT_VAULT_PATH: &str = "~/vault";

/// Subfolder with one note per study day.
pub const STUDY_FOLDER: &str = "учёба";

/// Subfolder with outbound and return commute notes.
pub const COMMUTE_FOLDER: &str = "дорога";

/// The sync window covers the current and the next calendar week.
pub const SYNC_WINDOW_DAYS: u32 = 14;

/// Format of wall-clock times in payloads, settings and notes.
pub const TIME_FORMAT: &str = "%H:%M";

/// Format of the `date` frontmatter key and note filenames.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
