//! Logging utilities for output and progress tracking

pub mod log;
pub mod progress;

pub use log::{InputSource, log_entry_warning, log_load_complete, log_load_start};
pub use progress::{create_main_progress_bar, create_spinner, finish_and_clear, finish_progress_bar};
