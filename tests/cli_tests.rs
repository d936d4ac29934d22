mod common;

use anyhow::Result;
use assert_cmd::{cargo, Command};
use common::{content_json, MockServer, Route, EXAMPLE_TABLE};
use predicates::prelude::*;

/// The binary with a clean environment: no CONF_* leaking in from the host.
fn conftable() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("conftable"));
    for var in [
        "CONF_BASE",
        "CONF_CONTEXT",
        "CONF_PAGE_ID",
        "CONF_USER",
        "CONF_TOKEN",
        "CONF_TIMEOUT_SECS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn example_server() -> MockServer {
    MockServer::start(vec![Route::new(
        "/wiki/rest/api/content/42",
        200,
        content_json(EXAMPLE_TABLE),
    )])
}

#[test]
fn help_lists_the_flags() -> Result<()> {
    conftable()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--only-done"))
        .stdout(predicate::str::contains("--page-id"))
        .stdout(predicate::str::contains("--conf-context"));
    Ok(())
}

#[test]
fn missing_page_id_fails_with_config_error() -> Result<()> {
    conftable()
        .args(["--user", "u", "--token", "t", "--no-input"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("page id"));
    Ok(())
}

#[test]
fn missing_token_without_prompt_fails() -> Result<()> {
    conftable()
        .args(["--page-id", "42", "--user", "u", "--no-input"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("token"));
    Ok(())
}

#[test]
fn prints_column_values_in_row_order() -> Result<()> {
    let server = example_server();
    let base = server.base();
    conftable()
        .args(["--conf-base", base.as_str(), "--conf-context", "/wiki"])
        .args(["--page-id", "42", "--user", "u", "--token", "t"])
        .args(["--col", "반영여부"])
        .assert()
        .success()
        .stdout("완료\n진행중\n");
    Ok(())
}

#[test]
fn only_done_keeps_done_rows() -> Result<()> {
    let server = example_server();
    let base = server.base();
    conftable()
        .args(["--conf-base", base.as_str(), "--page-id", "42"])
        .args(["--user", "u", "--token", "t", "--only-done"])
        .assert()
        .success()
        .stdout("완료\n");
    Ok(())
}

#[test]
fn settings_come_from_environment() -> Result<()> {
    let server = example_server();
    conftable()
        .env("CONF_BASE", server.base())
        .env("CONF_CONTEXT", "/wiki")
        .env("CONF_PAGE_ID", "42")
        .env("CONF_USER", "env-user")
        .env("CONF_TOKEN", "env-token")
        .args(["--col", "이름", "--no-input"])
        .assert()
        .success()
        .stdout("A\nB\n");

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    // base64("env-user:env-token")
    assert_eq!(
        reqs[0].authorization.as_deref(),
        Some("Basic ZW52LXVzZXI6ZW52LXRva2Vu")
    );
    Ok(())
}

#[test]
fn flag_overrides_environment() -> Result<()> {
    let server = example_server();
    let base = server.base();
    conftable()
        .env("CONF_BASE", common::closed_base())
        .env("CONF_PAGE_ID", "1")
        .args(["--conf-base", base.as_str(), "--page-id", "42"])
        .args(["--user", "u", "--token", "t"])
        .assert()
        .success();
    assert_eq!(server.requests()[0].path, "/wiki/rest/api/content/42");
    Ok(())
}

#[test]
fn rejected_credentials_exit_with_auth_code() -> Result<()> {
    let server = MockServer::start(vec![Route::new(
        "/wiki/rest/api/content/42",
        401,
        "nope",
    )]);
    let base = server.base();
    conftable()
        .args(["--conf-base", base.as_str(), "--page-id", "42"])
        .args(["--user", "u", "--token", "t"])
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("authentication failed"))
        .stderr(predicate::str::contains("status=401"));
    Ok(())
}

#[test]
fn unknown_page_exits_with_not_found_code() -> Result<()> {
    let server = MockServer::start(vec![]);
    let base = server.base();
    conftable()
        .args(["--conf-base", base.as_str(), "--page-id", "404404"])
        .args(["--user", "u", "--token", "t"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("page 404404 not found"));
    Ok(())
}

#[test]
fn page_without_table_exits_with_parse_code() -> Result<()> {
    let server = MockServer::start(vec![Route::new(
        "/wiki/rest/api/content/42",
        200,
        content_json("<p>nothing tabular</p>"),
    )]);
    let base = server.base();
    conftable()
        .args(["--conf-base", base.as_str(), "--page-id", "42"])
        .args(["--user", "u", "--token", "t"])
        .assert()
        .code(6)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no table found"));
    Ok(())
}

#[test]
fn unknown_column_exits_with_column_code() -> Result<()> {
    let server = example_server();
    let base = server.base();
    conftable()
        .args(["--conf-base", base.as_str(), "--page-id", "42"])
        .args(["--user", "u", "--token", "t", "--col", "담당자"])
        .assert()
        .code(7)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("column `담당자` not found"));
    Ok(())
}

#[test]
fn unreachable_server_exits_with_network_code() -> Result<()> {
    let closed = common::closed_base();
    conftable()
        .args(["--conf-base", closed.as_str(), "--page-id", "42"])
        .args(["--user", "u", "--token", "t"])
        .assert()
        .code(5);
    Ok(())
}

#[test]
fn blank_done_marker_is_a_config_error() -> Result<()> {
    conftable()
        .args(["--page-id", "42", "--user", "u", "--token", "t"])
        .args(["--only-done", "--done-marker", " ", "--no-input"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid done marker"));
    Ok(())
}
