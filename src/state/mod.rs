pub mod app_state;
pub mod measurement;
pub mod style;
