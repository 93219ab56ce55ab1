//! Init command - create project-local .larder.toml

use crate::cli::args::InitArgs;
use crate::config::LOCAL_CONFIG_NAME;
use crate::error::{LarderError, LarderResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;

/// Template for project-local config
const INIT_TEMPLATE: &str = r#"# Larder project configuration
# Settings here override your global config (~/.config/larder/config.toml)
# Docs: https://github.com/dean0x/larder

[worker]
# origin = "https://app.example.com"
# manifest_path = "build/web/manifest.json"
# core = ["index.html", "main.js"]

[store]
# backend = "fs"            # fs, memory
# dir = ".larder/store"
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> LarderResult<()> {
    let ctx = UiContext::detect();

    let target_dir = match args.path {
        Some(ref p) => p.clone(),
        None => {
            std::env::current_dir().map_err(|e| LarderError::io("getting current directory", e))?
        }
    };

    let config_path = target_dir.join(LOCAL_CONFIG_NAME);

    if config_path.exists() && !args.force {
        return Err(LarderError::User(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        )));
    }

    ensure_dir(&target_dir).await?;

    fs::write(&config_path, INIT_TEMPLATE)
        .await
        .map_err(|e| LarderError::io(format!("writing {}", config_path.display()), e))?;

    ui::step_ok_detail(
        &ctx,
        "Created project config",
        &config_path.display().to_string(),
    );

    Ok(())
}

async fn ensure_dir(dir: &Path) -> LarderResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| LarderError::io(format!("creating directory {}", dir.display()), e))?;
    }
    Ok(())
}
