//! Tests for CLI output formatting.
//!
//! - JSON output with --json flag
//! - Pretty-print output as default

use redmine_api::output::PrettyPrint;
use redmine_api::{Issue, Project, TimeEntry, WikiPage};

// ============================================================================
// JSON Output Tests
// ============================================================================

#[test]
fn test_json_flag_outputs_valid_json() {
    let project = make_test_project();
    let json_output = serde_json::to_string_pretty(&project).unwrap();

    // Verify it's valid JSON by parsing it back
    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert!(parsed.is_object());
    assert_eq!(parsed["identifier"], "platform");
}

#[test]
fn test_json_flag_for_list_outputs_array() {
    let issues = vec![make_test_issue(), make_test_issue()];
    let json_output = serde_json::to_string_pretty(&issues).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert!(parsed.is_array());
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[test]
fn test_json_output_keeps_status_code() {
    // Project status goes back out as the numeric wire code
    let project = make_test_project();
    let parsed = serde_json::to_value(&project).unwrap();

    assert_eq!(parsed["status"], 1);
    assert_eq!(parsed["id"], 5);
}

// ============================================================================
// Pretty-Print Tests
// ============================================================================

#[test]
fn test_default_output_is_not_json() {
    let project = make_test_project();
    let pretty_output = project.pretty_print();

    let parse_result: Result<serde_json::Value, _> = serde_json::from_str(&pretty_output);
    assert!(
        parse_result.is_err(),
        "Default output should NOT be valid JSON"
    );
}

#[test]
fn test_issue_pretty_print_shows_key_fields() {
    let output = make_test_issue().pretty_print();

    assert!(output.contains("Bug #42: Login fails"), "Should show heading");
    assert!(output.contains("Assignee:       Grace Hopper"));
    assert!(output.contains("Due:            2024-04-01"));
}

#[test]
fn test_time_entry_pretty_print_rounds_hours() {
    let entry: TimeEntry = serde_json::from_value(serde_json::json!({
        "id": 11,
        "project": {"id": 5, "name": "Platform"},
        "issue": {"id": 42},
        "user": {"id": 1, "name": "Redmine Admin"},
        "activity": {"id": 9, "name": "Development"},
        "hours": 1.5,
        "comments": "",
        "spent_on": "2024-03-04"
    }))
    .unwrap();

    let output = entry.pretty_print();
    assert!(output.contains("Hours:          1.50"));
    assert!(output.contains("Issue:          #42"));
    assert!(!output.contains("Comments"));
}

#[test]
fn test_wiki_pretty_print_includes_text() {
    let page: WikiPage = serde_json::from_value(serde_json::json!({
        "title": "Home",
        "text": "h1. Welcome",
        "version": 3,
        "author": {"id": 1, "name": "Redmine Admin"}
    }))
    .unwrap();

    let output = page.pretty_print();
    assert!(output.starts_with("Wiki: Home"));
    assert!(output.contains("Version:        3"));
    assert!(output.ends_with("h1. Welcome"));
}

#[test]
fn test_list_pretty_print_is_table() {
    // The table output from `tabled` carries a header row
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct TestRow {
        id: u64,
        subject: String,
    }

    let rows = vec![
        TestRow {
            id: 1,
            subject: "a".to_string(),
        },
        TestRow {
            id: 2,
            subject: "b".to_string(),
        },
    ];

    let table_output = Table::new(rows).to_string();

    assert!(table_output.contains("id"), "Should have column headers");
    assert!(table_output.contains("subject"), "Should have column headers");
}

// ============================================================================
// Test Helpers
// ============================================================================

fn make_test_project() -> Project {
    serde_json::from_value(serde_json::json!({
        "id": 5,
        "name": "Platform",
        "identifier": "platform",
        "description": "Core services",
        "status": 1,
        "is_public": true,
        "created_on": "2024-01-08T09:30:00Z"
    }))
    .unwrap()
}

fn make_test_issue() -> Issue {
    serde_json::from_value(serde_json::json!({
        "id": 42,
        "project": {"id": 5, "name": "Platform"},
        "tracker": {"id": 1, "name": "Bug"},
        "status": {"id": 2, "name": "In Progress"},
        "priority": {"id": 3, "name": "High"},
        "author": {"id": 7, "name": "Ada Lovelace"},
        "assigned_to": {"id": 8, "name": "Grace Hopper"},
        "subject": "Login fails",
        "due_date": "2024-04-01",
        "done_ratio": 50
    }))
    .unwrap()
}
