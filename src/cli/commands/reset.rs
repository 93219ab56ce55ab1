//! Reset command - clear all cache stores
//!
//! The same reset-to-empty action the worker takes when an activation
//! fails; the next sync starts from a never-installed state.

use crate::cli::args::ResetArgs;
use crate::cli::commands::apply_overrides;
use crate::config::Config;
use crate::error::LarderResult;
use crate::ui::{self, UiContext};
use crate::worker::factory::open_stores;

/// Execute the reset command
pub async fn execute(args: ResetArgs, config: &Config) -> LarderResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let config = apply_overrides(config.clone(), &args.overrides);

    let approved = ui::confirm(&ctx, "Clear all cache stores?", false).await?;
    if !approved {
        println!("Aborted.");
        return Ok(());
    }

    let stores = open_stores(&config).await?;
    stores.clear_all().await?;

    ui::step_ok(&ctx, "All stores cleared; next sync is a fresh install");
    Ok(())
}
