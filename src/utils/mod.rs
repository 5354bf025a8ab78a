pub mod lock;
pub mod tui;
