// integration tests for the check command

use crate::common::*;
use std::path::PathBuf;

fn setup(prefix: &str) -> (PathBuf, PathBuf) {
    let test_dir = create_test_dir(&unique_test_name(prefix));
    let config_path = test_dir.join("config.json");
    (test_dir, config_path)
}

fn check(config_path: &std::path::Path, attrs: &str, extra: &[&str]) -> std::process::Output {
    let mut args = vec!["--no-json", "check", "--attrs", attrs, "--now", "2024-03-06 12:00"];
    args.extend(extra);
    run_showfor(config_path, &args)
}

// ============================================================================
// decisions
// ============================================================================

#[test]
fn test_check_no_rule_is_visible() {
    let (test_dir, config_path) = setup("check_none");

    let output = check(&config_path, "", &[]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), "visible");

    let output = check(&config_path, r#"showfor="""#, &[]);
    assert_eq!(stdout_of(&output).trim(), "visible");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_logged_in_rules() {
    let (test_dir, config_path) = setup("check_login");

    let output = check(&config_path, r#"showfor="logged_in""#, &[]);
    assert_eq!(stdout_of(&output).trim(), "hidden");

    let output = check(&config_path, r#"showfor="logged_in""#, &["--user-id", "4"]);
    assert_eq!(stdout_of(&output).trim(), "visible");

    let output = check(&config_path, r#"showfor="not_logged_in""#, &["--user-id", "4"]);
    assert_eq!(stdout_of(&output).trim(), "hidden");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_roles() {
    let (test_dir, config_path) = setup("check_roles");
    let attrs = r#"showfor="selected_user_roles" selected_user_roles="editor, admin""#;

    let output = check(&config_path, attrs, &["--user-id", "2", "--role", "subscriber"]);
    assert_eq!(stdout_of(&output).trim(), "hidden");

    let output = check(&config_path, attrs, &["--user-id", "2", "--role", "editor"]);
    assert_eq!(stdout_of(&output).trim(), "visible");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_date_range() {
    let (test_dir, config_path) = setup("check_dates");
    let attrs = r#"showfor="date_range" start_date="2020/01/01" end_date="2020/12/31""#;

    let output = run_showfor(
        &config_path,
        &["--no-json", "check", "--attrs", attrs, "--now", "2020-06-15 08:00"],
    );
    assert_eq!(stdout_of(&output).trim(), "visible");

    let output = run_showfor(
        &config_path,
        &["--no-json", "check", "--attrs", attrs, "--now", "2021-01-01 08:00"],
    );
    assert_eq!(stdout_of(&output).trim(), "hidden");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_devices_from_user_agent() {
    let (test_dir, config_path) = setup("check_devices");
    let attrs = r#"showfor="selected_devices" selected_devices="phones""#;
    let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";

    let output = check(&config_path, attrs, &["--user-agent", iphone]);
    assert_eq!(stdout_of(&output).trim(), "visible");

    let output = check(&config_path, attrs, &["--device", "desktop"]);
    assert_eq!(stdout_of(&output).trim(), "hidden");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_url_parameters_from_url() {
    let (test_dir, config_path) = setup("check_url");
    // [{"name":"x","value":"1"}]
    let attrs = r#"showfor="url_parameters" url_params="JTVCJTdCJTIybmFtZSUyMiUzQSUyMnglMjIlMkMlMjJ2YWx1ZSUyMiUzQSUyMjElMjIlN0QlNUQ=""#;

    let output = check(&config_path, attrs, &["--url", "https://example.com/?x=1"]);
    assert_eq!(stdout_of(&output).trim(), "visible");

    let output = check(&config_path, attrs, &[]);
    assert_eq!(stdout_of(&output).trim(), "hidden");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_predicates_from_config_and_flags() {
    let test_dir = create_test_dir(&unique_test_name("check_predicates"));
    let config_path = write_config(
        &test_dir,
        &serde_json::json!({ "predicates": { "is_maintenance": true } }),
    );
    let attrs = r#"showfor="php_function" php_function_name="is_maintenance""#;

    let output = check(&config_path, attrs, &[]);
    assert_eq!(stdout_of(&output).trim(), "hidden");

    let output = check(&config_path, attrs, &["--predicate", "is_maintenance=false"]);
    assert_eq!(stdout_of(&output).trim(), "visible");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_shortcode_input() {
    let (test_dir, config_path) = setup("check_shortcode");

    let output = run_showfor(
        &config_path,
        &[
            "--json",
            "check",
            "--shortcode",
            r#"[vc_row showfor="logged_in"]content[/vc_row]"#,
        ],
    );
    assert!(output.status.success());

    let result = json_result(&output);
    assert_eq!(result["element"], "vc_row");
    assert_eq!(result["showfor"], "logged_in");
    assert_eq!(result["known"], true);
    assert_eq!(result["filtered"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_shortcode_skips_escaped_occurrence() {
    let (test_dir, config_path) = setup("check_shortcode_escaped");

    let output = run_showfor(
        &config_path,
        &[
            "--json",
            "check",
            "--shortcode",
            r#"[[vc_row showfor="logged_in" /]] [vc_row showfor="not_logged_in"]x[/vc_row]"#,
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let result = json_result(&output);
    assert_eq!(result["showfor"], "not_logged_in");
    assert_eq!(result["filtered"], false);

    let output = run_showfor(
        &config_path,
        &["--no-json", "check", "--shortcode", r#"[[vc_row showfor="logged_in"]]"#],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("escaped"));

    cleanup_test_dir(&test_dir);
}

// ============================================================================
// exit codes and errors
// ============================================================================

#[test]
fn test_check_exit_code_flag() {
    let (test_dir, config_path) = setup("check_exit");

    let output = check(&config_path, r#"showfor="logged_in""#, &["--exit-code"]);
    assert_eq!(output.status.code(), Some(5));

    let output = check(&config_path, r#"showfor="not_logged_in""#, &["--exit-code"]);
    assert_eq!(output.status.code(), Some(0));

    let output = check(&config_path, r#"showfor="logged_in""#, &[]);
    assert_eq!(output.status.code(), Some(0));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_unknown_kind_suggests() {
    let (test_dir, config_path) = setup("check_unknown");

    let output = check(&config_path, r#"showfor="loged_in""#, &[]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), "visible");
    assert!(stderr_of(&output).contains("did you mean 'logged_in'"));

    let output = run_showfor(
        &config_path,
        &["--json", "check", "--attrs", r#"showfor="loged_in""#],
    );
    let result = json_result(&output);
    assert_eq!(result["known"], false);
    assert_eq!(result["suggestion"], "logged_in");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_invalid_now() {
    let (test_dir, config_path) = setup("check_bad_now");

    let output = run_showfor(
        &config_path,
        &["--no-json", "check", "--attrs", "", "--now", "soon"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("invalid --now"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_error_as_json() {
    let (test_dir, config_path) = setup("check_json_error");

    let output = run_showfor(
        &config_path,
        &["--json", "check", "--attrs", "", "--query", "novalue"],
    );
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value = serde_json::from_str(stdout_of(&output).trim()).unwrap();
    assert_eq!(value["error"]["code"], -32002);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_broken_config() {
    let test_dir = create_test_dir(&unique_test_name("check_broken_config"));
    let config_path = test_dir.join("config.json");
    std::fs::write(&config_path, "{ not json").unwrap();

    let output = check(&config_path, "", &[]);
    assert_eq!(output.status.code(), Some(3));

    cleanup_test_dir(&test_dir);
}
