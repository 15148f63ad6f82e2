// UI and formatting module

pub mod dashboard_tui;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use prompts::{confirm, dimmed, error, info, success, warn};
