// integration tests for the scan, strip and render commands

use crate::common::*;
use std::fs;

const POST: &str = r#"<p>intro</p>[vc_row showfor="logged_in"]members[/vc_row][vc_row showfor="not_logged_in"]guests[/vc_row][[vc_row showfor="logged_in"]]"#;

// ============================================================================
// scan
// ============================================================================

#[test]
fn test_scan_reports_occurrences() {
    let test_dir = create_test_dir(&unique_test_name("scan"));
    let config_path = test_dir.join("config.json");
    let post = test_dir.join("post.txt");
    fs::write(&post, POST).unwrap();

    let output = run_showfor(
        &config_path,
        &["--json", "scan", "vc_row", post.to_str().unwrap(), "--now", "2024-03-06 12:00"],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let result = json_result(&output);
    assert_eq!(result["tag"], "vc_row");
    let occurrences = result["occurrences"].as_array().unwrap();
    assert_eq!(occurrences.len(), 3);

    assert_eq!(occurrences[0]["start"], 12);
    assert_eq!(occurrences[0]["filtered"], true);
    assert_eq!(occurrences[0]["attributes"]["showfor"], "logged_in");
    assert_eq!(occurrences[1]["filtered"], false);
    assert_eq!(occurrences[2]["escaped"], true);
    assert!(occurrences[2]["filtered"].is_null());

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_scan_text_output_from_stdin() {
    let test_dir = create_test_dir(&unique_test_name("scan_text"));
    let config_path = test_dir.join("config.json");

    let output = run_showfor_with_stdin(
        &config_path,
        &["--no-json", "scan", "vc_row", "--user-id", "9"],
        POST,
    );
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("[vc_row] 3 occurrence(s)"));
    assert!(stdout.contains("visible"));
    assert!(stdout.contains("hidden"));
    assert!(stdout.contains("escaped"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_scan_missing_file() {
    let test_dir = create_test_dir(&unique_test_name("scan_missing"));
    let config_path = test_dir.join("config.json");

    let output = run_showfor(
        &config_path,
        &["--no-json", "scan", "vc_row", test_dir.join("nope.txt").to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(4));

    cleanup_test_dir(&test_dir);
}

// ============================================================================
// strip
// ============================================================================

#[test]
fn test_strip_to_stdout_with_element_flag() {
    let test_dir = create_test_dir(&unique_test_name("strip_stdout"));
    let config_path = test_dir.join("config.json");

    let output = run_showfor_with_stdin(
        &config_path,
        &["--no-json", "strip", "--element", "vc_row"],
        POST,
    );
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        r#"<p>intro</p>[vc_row showfor="not_logged_in"]guests[/vc_row][[vc_row showfor="logged_in"]]"#
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_strip_in_place_uses_advanced_settings() {
    let test_dir = create_test_dir(&unique_test_name("strip_in_place"));
    let config_path = write_config(
        &test_dir,
        &serde_json::json!({
            "settings": {
                "enabled": { "vc_row": "on" },
                "advanced": { "vc_row": "on" }
            }
        }),
    );
    let post = test_dir.join("post.txt");
    fs::write(&post, POST).unwrap();

    let output = run_showfor(
        &config_path,
        &["--json", "strip", "--in-place", post.to_str().unwrap(), "--user-id", "3"],
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let result = json_result(&output);
    assert_eq!(result["changed"], true);
    assert_eq!(result["elements"], serde_json::json!(["vc_row"]));

    let stripped = fs::read_to_string(&post).unwrap();
    assert_eq!(
        stripped,
        r#"<p>intro</p>[vc_row showfor="logged_in"]members[/vc_row][[vc_row showfor="logged_in"]]"#
    );

    // second pass has nothing left to remove
    let output = run_showfor(
        &config_path,
        &["--json", "strip", "--in-place", post.to_str().unwrap(), "--user-id", "3"],
    );
    assert_eq!(json_result(&output)["changed"], false);
    assert_eq!(fs::read_to_string(&post).unwrap(), stripped);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_strip_without_advanced_elements_warns() {
    let test_dir = create_test_dir(&unique_test_name("strip_nothing"));
    let config_path = test_dir.join("config.json");

    let output = run_showfor_with_stdin(&config_path, &["--no-json", "strip"], POST);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), POST);
    assert!(stderr_of(&output).contains("no advanced elements"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_strip_in_place_needs_file() {
    let test_dir = create_test_dir(&unique_test_name("strip_stdin_in_place"));
    let config_path = test_dir.join("config.json");

    let output = run_showfor(&config_path, &["--no-json", "strip", "--in-place"]);
    assert_eq!(output.status.code(), Some(2));

    cleanup_test_dir(&test_dir);
}

// ============================================================================
// render
// ============================================================================

#[test]
fn test_render_filters_enabled_elements_only() {
    let test_dir = create_test_dir(&unique_test_name("render"));
    let config_path = write_config(
        &test_dir,
        &serde_json::json!({
            "settings": {
                "enabled": { "vc_row": "on", "vc_btn": "disabled" }
            }
        }),
    );
    let attrs = r#"showfor="logged_in""#;

    let output = run_showfor_with_stdin(
        &config_path,
        &["--no-json", "render", "vc_row", "--attrs", attrs],
        "<div>row</div>",
    );
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "");

    let output = run_showfor_with_stdin(
        &config_path,
        &["--no-json", "render", "vc_btn", "--attrs", attrs],
        "<a>btn</a>",
    );
    assert_eq!(stdout_of(&output), "<a>btn</a>");

    let output = run_showfor_with_stdin(
        &config_path,
        &["--json", "render", "vc_row", "--attrs", attrs, "--user-id", "1"],
        "<div>row</div>",
    );
    let result = json_result(&output);
    assert_eq!(result["checked"], true);
    assert_eq!(result["filtered"], false);
    assert_eq!(result["output"], "<div>row</div>");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_render_reports_hidden_empty_output() {
    let test_dir = create_test_dir(&unique_test_name("render_empty"));
    let config_path = write_config(
        &test_dir,
        &serde_json::json!({ "settings": { "enabled": { "vc_row": "on" } } }),
    );

    let output = run_showfor_with_stdin(
        &config_path,
        &["--json", "render", "vc_row", "--attrs", r#"showfor="logged_in""#],
        "",
    );
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));

    let result = json_result(&output);
    assert_eq!(result["checked"], true);
    assert_eq!(result["filtered"], true);
    assert_eq!(result["output"], "");

    cleanup_test_dir(&test_dir);
}
