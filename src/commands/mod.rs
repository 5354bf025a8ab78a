pub mod config;
pub mod sync;

/// Shown whenever the timetable could not be fetched.
pub const SYNC_FAILED_NOTICE: &str = "Не удалось загрузить расписание. Проверьте подключение к интернету и правильность токена в настройках.";
