//! CLI error handling tests for bn-core.
//!
//! Invalid arguments, inputs and configuration must produce structured
//! errors on stderr and stable exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use tempfile::NamedTempFile;

fn bn_core() -> Command {
    let mut cmd = Command::cargo_bin("bn-core").expect("bn-core binary should exist");
    cmd.env_remove("BN_ENGINE_CONFIG")
        .env_remove("BN_CONFIG_DIR")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", "/nonexistent/bn-core-tests")
        .env("BN_LOG", "error");
    cmd
}

fn bif_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Run and return (exit code, structured error from stderr).
fn failing(cmd: &mut Command) -> (i32, Value) {
    let output = cmd.output().expect("command should run");
    let code = output.status.code().expect("exit code");
    let err: Value = serde_json::from_slice(&output.stderr).unwrap_or_else(|e| {
        panic!(
            "stderr is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stderr)
        )
    });
    assert!(output.stdout.is_empty(), "no payload on failure");
    (code, err)
}

// ============================================================================
// Arguments
// ============================================================================

mod arguments {
    use super::*;

    #[test]
    fn unknown_command_exits_with_args_error() {
        bn_core()
            .arg("nonexistent-command")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_flag_exits_with_args_error() {
        bn_core()
            .args(["infer", "--nonexistent-flag"])
            .assert()
            .code(10);
    }

    #[test]
    fn invalid_format_is_rejected() {
        bn_core()
            .args(["--format", "xml", "infer"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("xml"));
    }

    #[test]
    fn invalid_policy_is_rejected() {
        bn_core()
            .args(["infer", "--cycle-policy", "sometimes"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("unknown cycle policy"));
    }
}

// ============================================================================
// Evidence and query
// ============================================================================

mod query {
    use super::*;

    #[test]
    fn unknown_evidence_variable() {
        let (code, err) = failing(bn_core().args(["infer", "-e", "rain=true"]));
        assert_eq!(code, 12);
        assert_eq!(err["code"], 40);
        assert_eq!(err["category"], "query");
        assert_eq!(err["context"]["variable"], "rain");
        assert_eq!(err["context"]["exit_code"], "ERR_QUERY");
    }

    #[test]
    fn unknown_evidence_value() {
        let (code, err) = failing(bn_core().args(["infer", "-e", "a=maybe"]));
        assert_eq!(code, 12);
        assert_eq!(err["code"], 41);
        assert_eq!(err["context"]["value"], "maybe");
    }

    #[test]
    fn malformed_evidence() {
        let (code, err) = failing(bn_core().args(["infer", "-e", "a"]));
        assert_eq!(code, 12);
        assert_eq!(err["code"], 42);
    }

    #[test]
    fn conflicting_evidence() {
        let (code, err) = failing(bn_core().args(["infer", "-e", "a=true,a=false"]));
        assert_eq!(code, 12);
        assert!(err["message"].as_str().unwrap().contains("both"));
    }

    #[test]
    fn unknown_query_variable() {
        let (code, err) = failing(bn_core().args(["infer", "-q", "zz"]));
        assert_eq!(code, 12);
        assert_eq!(err["code"], 43);
    }

    #[test]
    fn unknown_query_is_rejected_before_enumeration() {
        // A state-space limit of 8 would stop the 32-state run; the query
        // error must come first.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"max_joint_states": 8}"#).unwrap();
        let (code, err) = failing(
            bn_core()
                .arg("--config")
                .arg(&path)
                .args(["infer", "-q", "zz"]),
        );
        assert_eq!(code, 12);
        assert_eq!(err["code"], 43);
        assert_eq!(err["context"]["variable"], "zz");
    }

    #[test]
    fn human_errors_have_a_fix_line() {
        bn_core()
            .args(["--format", "summary", "--no-color", "infer", "-e", "rain=true"])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("Reason:"))
            .stderr(predicate::str::contains("Fix:"))
            .stderr(predicate::str::contains("rain"));
    }
}

// ============================================================================
// Network input
// ============================================================================

mod input {
    use super::*;

    #[test]
    fn missing_file_is_an_io_error() {
        let (code, err) = failing(bn_core().args(["infer", "-f", "/no/such/network.bif"]));
        assert_eq!(code, 21);
        assert_eq!(err["category"], "io");
    }

    #[test]
    fn syntax_error_reports_position() {
        let file = bif_file("variable a {\n  type discrete [2] { t, f }\n}\n");
        let (code, err) = failing(bn_core().arg("infer").arg("-f").arg(file.path()));
        assert_eq!(code, 11);
        assert_eq!(err["code"], 10);
        assert!(err["message"].as_str().unwrap().contains("line 3"));
    }

    #[test]
    fn missing_distribution_is_invalid_network() {
        let file = bif_file("variable a { type discrete [2] { t, f }; }\n");
        let (code, err) = failing(bn_core().arg("show").arg("-f").arg(file.path()));
        assert_eq!(code, 11);
        assert_eq!(err["code"], 11);
    }

    #[test]
    fn table_with_wrong_length_is_rejected() {
        let file = bif_file(
            r#"
            variable x { type discrete [2] { t, f }; }
            variable y { type discrete [2] { t, f }; }
            probability (x) { table 0.5, 0.5; }
            probability (y | x) { table 0.9, 0.1; }
            "#,
        );
        let (code, err) = failing(bn_core().arg("infer").arg("-f").arg(file.path()));
        assert_eq!(code, 11);
        assert_eq!(err["code"], 10);
        assert!(err["message"].as_str().unwrap().contains("expected 2 rows"));
    }
}

// ============================================================================
// Structure
// ============================================================================

mod structure {
    use super::*;

    const CYCLE: &str = r#"
        variable a { type discrete [2] { t, f }; }
        variable b { type discrete [2] { t, f }; }
        probability (a | b) { table 0.5 0.5 0.5 0.5; }
        probability (b | a) { table 0.5 0.5 0.5 0.5; }
    "#;

    #[test]
    fn cycle_is_rejected_by_default() {
        let file = bif_file(CYCLE);
        let (code, err) = failing(bn_core().arg("infer").arg("-f").arg(file.path()));
        assert_eq!(code, 13);
        assert_eq!(err["code"], 20);
        let from = err["context"]["from"].as_str().unwrap();
        let to = err["context"]["to"].as_str().unwrap();
        assert_ne!(from, to);
        assert!(["a", "b"].contains(&from) && ["a", "b"].contains(&to));
    }

    #[test]
    fn warn_policy_still_refuses_to_enumerate() {
        let file = bif_file(CYCLE);
        let (code, err) = failing(
            bn_core()
                .args(["infer", "--cycle-policy", "warn", "-f"])
                .arg(file.path()),
        );
        assert_eq!(code, 13);
        assert_eq!(err["code"], 22);
    }

    #[test]
    fn warn_policy_lets_show_run() {
        let file = bif_file(CYCLE);
        bn_core()
            .args(["show", "--cycle-policy", "warn", "-f"])
            .arg(file.path())
            .assert()
            .success();
    }

    #[test]
    fn check_reports_cycle() {
        let file = bif_file(CYCLE);
        let output = bn_core().arg("check").arg("-f").arg(file.path()).output().unwrap();
        assert_eq!(output.status.code(), Some(13));
        let json: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["clean"], false);
        assert!(json["cycle"].as_str().unwrap().contains("cycle"));
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod config {
    use super::*;

    #[test]
    fn missing_config_file() {
        let (code, err) = failing(bn_core().args(["--config", "/no/such/engine.json", "infer"]));
        assert_eq!(code, 14);
        assert_eq!(err["code"], 60);
    }

    #[test]
    fn invalid_config_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"evidence_epsilon": -1.0}"#).unwrap();
        let (code, err) = failing(bn_core().arg("--config").arg(&path).arg("infer"));
        assert_eq!(code, 14);
        assert_eq!(err["code"], 61);
        assert!(err["message"].as_str().unwrap().contains("evidence_epsilon"));
    }

    #[test]
    fn env_config_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"schema_version": "0.1.0"}"#).unwrap();
        let (code, _) = failing(bn_core().env("BN_ENGINE_CONFIG", &path).arg("infer"));
        assert_eq!(code, 14);
    }
}
