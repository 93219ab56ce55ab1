//! Sync command - run one install + activate upgrade cycle

use crate::cli::args::SyncArgs;
use crate::cli::commands::apply_overrides;
use crate::config::Config;
use crate::error::LarderResult;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::worker::factory::build_worker;
use tracing::debug;

/// Execute the sync command
pub async fn execute(args: SyncArgs, config: &Config) -> LarderResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config.clone(), &args.overrides);

    ui::intro(&ctx, "Larder Sync");

    let mut worker = build_worker(&config).await?;
    ui::key_value(&ctx, "origin", worker.origin());
    ui::key_value(&ctx, "manifest", &format!("{} entries", worker.manifest().len()));

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Staging core set...");
    match worker.install().await {
        Ok(staged) => spinner.stop(&format!("Staged {} core resources", staged)),
        Err(e) => {
            spinner.stop_error("Install failed");
            return Err(e);
        }
    }

    spinner.start("Activating...");
    match worker.activate().await {
        Ok(report) => {
            if report.first_install {
                spinner.stop(&format!(
                    "Activated from clean slate, {} promoted",
                    report.promoted
                ));
            } else {
                spinner.stop(&format!(
                    "Activated: {} preserved, {} evicted, {} promoted",
                    report.preserved, report.evicted, report.promoted
                ));
            }
        }
        Err(e) => {
            spinner.stop_error("Activation failed, caches were reset");
            return Err(e);
        }
    }

    debug!(state = %worker.state(), "sync cycle finished");
    ui::outro_success(&ctx, "Cache is ready");
    Ok(())
}
