//! Integration tests for freewatch

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated from the user's config and state
    fn freewatch(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("freewatch");
        cmd.env("FREEWATCH_CONFIG", temp.path().join("config.toml"))
            .env("FREEWATCH_STATE_DIR", temp.path().join("state"))
            .env("CI", "1");
        cmd
    }

    fn write_cache(state_dir: &Path, file: &str, json: &str) {
        let caches = state_dir.join("caches");
        std::fs::create_dir_all(&caches).unwrap();
        std::fs::write(caches.join(file), json).unwrap();
    }

    const DENVER_STATE: &str = r#"{
        "service": "Denver",
        "max": 3,
        "count": 4,
        "cache_set": ["b", "c", "d"],
        "seen": ["d", "b", "c"]
    }"#;

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("classified"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("freewatch"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("capacity = 250"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp).args(["config", "init"]).assert().success();

        let written = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
        assert!(written.contains("[[sources]]"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[cache]\ncapacity = 0\n").unwrap();

        freewatch(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("config init --force"));
    }

    #[test]
    fn sources_sharing_a_cache_file_are_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            r#"
[[sources]]
name = "Denver"
url = "https://denver.example.org/zip"

[[sources]]
name = "denver"
url = "https://other.example.org/zip"
"#,
        )
        .unwrap();

        freewatch(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("denver.json"));
    }

    #[test]
    fn match_reports_keyword() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .args(["match", "Free TV, good condition!"])
            .assert()
            .success()
            .stdout(predicate::str::contains("free tv good condition"))
            .stdout(predicate::str::contains("keyword: tv"));
    }

    #[test]
    fn match_reports_miss() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .args(["match", "nothing interesting"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no match"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn cache_list_and_show() {
        let temp = TempDir::new().unwrap();
        write_cache(&temp.path().join("state"), "denver.json", DENVER_STATE);

        freewatch(&temp)
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Denver"));

        freewatch(&temp)
            .args(["cache", "show", "Denver"])
            .assert()
            .success()
            .stdout(predicate::str::contains("inserted: 4"))
            .stdout(predicate::str::contains("next slot: 1"));
    }

    #[test]
    fn cache_show_missing_source() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .args(["cache", "show", "Pueblo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Source not found"));
    }

    #[test]
    fn cache_show_rejects_inconsistent_state() {
        let temp = TempDir::new().unwrap();
        write_cache(
            &temp.path().join("state"),
            "denver.json",
            r#"{"service": "Denver", "max": 3, "count": 4,
                "cache_set": ["a", "b", "c", "d"], "seen": ["d", "b", "c"]}"#,
        );

        freewatch(&temp)
            .args(["cache", "show", "Denver"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache state for Denver"))
            .stderr(predicate::str::contains("cache clear"));
    }

    #[test]
    fn cache_clear_requires_confirmation() {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state");
        write_cache(&state, "denver.json", DENVER_STATE);

        freewatch(&temp)
            .args(["cache", "clear", "Denver"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing cleared"));
        assert!(state.join("caches/denver.json").exists());

        freewatch(&temp)
            .args(["cache", "clear", "Denver", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared Denver"));
        assert!(!state.join("caches/denver.json").exists());
    }

    #[test]
    fn run_unknown_source_fails() {
        let temp = TempDir::new().unwrap();
        freewatch(&temp)
            .args(["run", "--once", "--source", "Pueblo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Source not found: Pueblo"));
    }
}
