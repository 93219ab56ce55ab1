//! Get command - serve one resource through the cache policies

use crate::cli::args::GetArgs;
use crate::cli::commands::apply_overrides;
use crate::config::Config;
use crate::error::{LarderError, LarderResult};
use crate::fetch::ResourceRequest;
use crate::worker::factory::build_worker;
use crate::worker::Served;
use console::style;
use std::io::Write;
use tokio::fs;

/// Execute the get command
pub async fn execute(args: GetArgs, config: &Config) -> LarderResult<()> {
    let config = apply_overrides(config.clone(), &args.overrides);
    let worker = build_worker(&config).await?;

    let url = worker.url_for(&args.path);
    let request = ResourceRequest::get(&url);

    let served = worker.handle_fetch(&request).await?;
    let (source, response) = match served {
        Served::Passthrough => {
            eprintln!(
                "{} {} is not a manifest resource; request would pass through",
                style("[WARN]").yellow(),
                args.path
            );
            return Ok(());
        }
        Served::Cached(response) => ("cache", response),
        Served::Network(response) => ("network", response),
    };

    eprintln!(
        "{} {} ({} bytes, status {}, from {})",
        style("[OK]").green(),
        args.path,
        response.body.len(),
        response.status,
        source
    );

    match args.output {
        Some(path) => {
            fs::write(&path, &response.body)
                .await
                .map_err(|e| LarderError::io(format!("writing {}", path.display()), e))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&response.body)
                .map_err(|e| LarderError::io("writing body to stdout", e))?;
        }
    }

    Ok(())
}
