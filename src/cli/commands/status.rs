//! Status command - show worker, store and applied-manifest state

use crate::cli::args::StatusArgs;
use crate::cli::commands::apply_overrides;
use crate::config::Config;
use crate::error::LarderResult;
use crate::ui::{self, UiContext};
use crate::worker::factory::open_stores;

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> LarderResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config.clone(), &args.overrides);

    ui::intro(&ctx, "Larder Status");

    ui::section(&ctx, "Worker");
    ui::key_value(&ctx, "origin", &config.worker.origin);
    let manifest = config
        .worker
        .manifest_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unset)".to_string());
    ui::key_value(&ctx, "manifest", &manifest);

    let stores = open_stores(&config).await?;

    ui::section(&ctx, "Stores");
    for store in [&stores.staging, &stores.content, &stores.record] {
        let entries = store.len().await?;
        ui::key_value(&ctx, store.name(), &format!("{} entries", entries));
    }

    ui::section(&ctx, "Applied manifest");
    match stores.applied_manifest().await {
        Ok(Some(applied)) => {
            ui::key_value(&ctx, "entries", &applied.len().to_string());
        }
        Ok(None) => {
            ui::key_value(&ctx, "entries", "none (never activated)");
        }
        Err(e) => {
            ui::step_warn_hint(
                &ctx,
                &format!("manifest record unreadable: {}", e),
                "Run: larder reset --yes",
            );
        }
    }

    Ok(())
}
