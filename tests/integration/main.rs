//! Integration tests for the save-dart-cache binary

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn step() -> Command {
        let mut cmd = cargo_bin_cmd!("save-dart-cache");
        // Step inputs must come from the test, not the surrounding environment
        cmd.env_remove("verbose")
            .env_remove("compression_level")
            .env_remove("CACHE_STORE_DIR");
        cmd
    }

    #[test]
    fn help_displays() {
        step()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Save the Dart pub cache"));
    }

    #[test]
    fn version_displays() {
        step()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("save-dart-cache"));
    }

    #[test]
    fn missing_inputs_fail() {
        step()
            .assert()
            .failure()
            .stderr(predicate::str::contains("required input not set: verbose"));
    }

    #[test]
    fn missing_compression_level_fails() {
        step()
            .env("verbose", "true")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "required input not set: compression_level",
            ));
    }

    #[test]
    fn out_of_range_level_fails() {
        for level in ["0", "20"] {
            step()
                .env("verbose", "false")
                .env("compression_level", level)
                .assert()
                .failure()
                .stderr(predicate::str::contains("compression_level"))
                .stderr(predicate::str::contains("must be between 1 and 19"));
        }
    }

    #[test]
    fn malformed_level_fails() {
        step()
            .env("verbose", "false")
            .env("compression_level", "fastest")
            .assert()
            .failure();
    }
}

mod save_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    struct SaveFixture {
        home: TempDir,
        store: TempDir,
        project: TempDir,
    }

    impl SaveFixture {
        fn new() -> Self {
            let home = TempDir::new().unwrap();
            let pub_cache = home.path().join(".pub-cache");
            fs::create_dir_all(pub_cache.join("hosted")).unwrap();
            fs::write(pub_cache.join("hosted").join("package.tar"), b"bytes").unwrap();

            let project = TempDir::new().unwrap();
            fs::write(project.path().join("pubspec.lock"), b"packages: {}").unwrap();

            Self {
                home,
                store: TempDir::new().unwrap(),
                project,
            }
        }

        fn command(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("save-dart-cache");
            cmd.env("HOME", self.home.path())
                .env("CACHE_STORE_DIR", self.store.path())
                .env("verbose", "true")
                .env("compression_level", "9")
                .current_dir(self.project.path());
            cmd
        }

        fn store_entries(&self, extension: &str) -> Vec<std::path::PathBuf> {
            fs::read_dir(self.store.path())
                .unwrap()
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
                .collect()
        }
    }

    #[test]
    fn saves_pub_cache_end_to_end() {
        let fixture = SaveFixture::new();

        fixture
            .command()
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache key:"))
            .stdout(predicate::str::contains("~/.pub-cache"));

        let archives = fixture.store_entries("zst");
        assert_eq!(archives.len(), 1, "expected one archive in the store");
        assert!(fs::metadata(&archives[0]).unwrap().len() > 0);
        assert_eq!(fixture.store_entries("json").len(), 1);
    }

    #[test]
    fn second_save_with_same_key_is_skipped() {
        let fixture = SaveFixture::new();

        fixture.command().assert().success();
        fixture
            .command()
            .assert()
            .success()
            .stdout(predicate::str::contains("skipping save"));

        assert_eq!(fixture.store_entries("zst").len(), 1);
    }

    #[test]
    fn absent_pub_cache_succeeds_without_saving() {
        let fixture = SaveFixture::new();
        fs::remove_dir_all(fixture.home.path().join(".pub-cache")).unwrap();

        fixture
            .command()
            .assert()
            .success()
            .stdout(predicate::str::contains("nothing to save"));

        assert!(fixture.store_entries("zst").is_empty());
    }

    #[test]
    fn changed_lockfile_produces_new_entry() {
        let fixture = SaveFixture::new();

        fixture.command().assert().success();

        fs::write(
            fixture.project.path().join("pubspec.lock"),
            b"packages: {args: 2.7.0}",
        )
        .unwrap();
        fixture.command().assert().success();

        assert_eq!(
            fixture.store_entries("zst").len(),
            2,
            "a different lock state must address a different entry"
        );
    }
}
