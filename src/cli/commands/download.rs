//! Download command - fill every manifest entry missing from the cache
//!
//! This is the CLI face of the `downloadOffline` message: best-effort
//! bulk fill so the whole bundle is available offline.

use crate::cli::args::DownloadArgs;
use crate::cli::commands::apply_overrides;
use crate::config::Config;
use crate::error::LarderResult;
use crate::ui::{self, FetchProgress, UiContext};
use crate::worker::factory::build_worker;

/// Execute the download command
pub async fn execute(args: DownloadArgs, config: &Config) -> LarderResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config.clone(), &args.overrides);

    let worker = build_worker(&config).await?;
    let total = worker.manifest().len() as u64;

    let progress = FetchProgress::new(&ctx, "Downloading", total);
    let result = worker
        .download_offline_with(|key| progress.on_done(key))
        .await;
    progress.finish();

    let fetched = result?;
    if fetched == 0 {
        ui::step_ok(&ctx, "Already complete, nothing to download");
    } else {
        ui::step_ok_detail(
            &ctx,
            "Offline copy complete",
            &format!("{} resources downloaded", fetched),
        );
    }

    Ok(())
}
