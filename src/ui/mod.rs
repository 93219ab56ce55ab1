//! UI module for consistent CLI output
//!
//! Uses `cliclack` for interactive spinners and prompts with automatic
//! fallback to plain output in CI/non-interactive environments.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, note, outro_error, outro_success, section, step_ok, step_ok_detail,
    step_warn, step_warn_hint,
};
pub use progress::{FetchProgress, TaskSpinner};
pub use prompts::confirm;
