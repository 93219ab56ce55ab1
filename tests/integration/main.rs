//! Integration tests for Larder

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn larder() -> Command {
        cargo_bin_cmd!("larder")
    }

    #[test]
    fn help_displays() {
        larder()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline-first asset cache worker"));
    }

    #[test]
    fn version_displays() {
        larder()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("larder"));
    }

    #[test]
    fn config_show() {
        let temp = tempfile::TempDir::new().unwrap();
        larder()
            .args(["--no-local", "config", "show"])
            .arg("--config")
            .arg(temp.path().join("config.toml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("[worker]"));
    }

    #[test]
    fn config_path() {
        let temp = tempfile::TempDir::new().unwrap();
        larder()
            .env("XDG_CONFIG_HOME", temp.path())
            .args(["--no-local", "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn sync_without_manifest_fails_with_hint() {
        let temp = tempfile::TempDir::new().unwrap();
        larder()
            .current_dir(temp.path())
            .args(["sync", "--memory"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No resource manifest configured"))
            .stderr(predicate::str::contains("worker.manifest_path"));
    }

    #[test]
    fn get_unknown_path_passes_through() {
        let temp = tempfile::TempDir::new().unwrap();
        let manifest = temp.path().join("manifest.json");
        std::fs::write(&manifest, r#"{"/": "h0", "index.html": "h0"}"#).unwrap();

        larder()
            .current_dir(temp.path())
            .args(["get", "api/data.json", "--memory"])
            .arg("--manifest")
            .arg(&manifest)
            .args(["--origin", "https://app.example.com"])
            .assert()
            .success()
            .stderr(predicate::str::contains("not a manifest resource"));
    }

    #[test]
    fn reset_aborts_without_confirmation() {
        let temp = tempfile::TempDir::new().unwrap();
        larder()
            .current_dir(temp.path())
            .args(["reset", "--memory"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));
    }
}

mod sync_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;

    fn larder() -> Command {
        cargo_bin_cmd!("larder")
    }

    fn write_manifest(dir: &Path, json: &str) -> std::path::PathBuf {
        let path = dir.join("manifest.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    /// With an empty core set, a full sync cycle touches no network.
    #[test]
    fn sync_cycle_records_manifest() {
        let temp = tempfile::TempDir::new().unwrap();
        let manifest = write_manifest(temp.path(), r#"{"/": "h0", "index.html": "h0"}"#);
        let store = temp.path().join("store");

        larder()
            .current_dir(temp.path())
            .arg("sync")
            .arg("--manifest")
            .arg(&manifest)
            .args(["--origin", "https://app.example.com"])
            .arg("--store-dir")
            .arg(&store)
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is ready"));

        larder()
            .current_dir(temp.path())
            .arg("status")
            .arg("--store-dir")
            .arg(&store)
            .assert()
            .success()
            .stdout(predicate::str::contains("2"));
    }

    #[test]
    fn repeated_sync_is_idempotent() {
        let temp = tempfile::TempDir::new().unwrap();
        let manifest = write_manifest(temp.path(), r#"{"/": "h0", "index.html": "h0"}"#);
        let store = temp.path().join("store");

        for _ in 0..2 {
            larder()
                .current_dir(temp.path())
                .arg("sync")
                .arg("--manifest")
                .arg(&manifest)
                .args(["--origin", "https://app.example.com"])
                .arg("--store-dir")
                .arg(&store)
                .assert()
                .success();
        }
    }

    #[test]
    fn reset_returns_to_never_activated() {
        let temp = tempfile::TempDir::new().unwrap();
        let manifest = write_manifest(temp.path(), r#"{"/": "h0"}"#);
        let store = temp.path().join("store");

        larder()
            .current_dir(temp.path())
            .arg("sync")
            .arg("--manifest")
            .arg(&manifest)
            .args(["--origin", "https://app.example.com"])
            .arg("--store-dir")
            .arg(&store)
            .assert()
            .success();

        larder()
            .current_dir(temp.path())
            .args(["reset", "--yes"])
            .arg("--store-dir")
            .arg(&store)
            .assert()
            .success()
            .stdout(predicate::str::contains("All stores cleared"));

        larder()
            .current_dir(temp.path())
            .arg("status")
            .arg("--store-dir")
            .arg(&store)
            .assert()
            .success()
            .stdout(predicate::str::contains("never activated"));
    }

    #[test]
    fn sync_fails_when_core_path_missing_from_manifest() {
        let temp = tempfile::TempDir::new().unwrap();
        let manifest = write_manifest(temp.path(), r#"{"/": "h0"}"#);
        std::fs::write(
            temp.path().join(".larder.toml"),
            r#"
                [worker]
                core = ["missing.js"]
            "#,
        )
        .unwrap();

        larder()
            .current_dir(temp.path())
            .args(["sync", "--memory"])
            .arg("--manifest")
            .arg(&manifest)
            .args(["--origin", "https://app.example.com"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing.js"));
    }
}
