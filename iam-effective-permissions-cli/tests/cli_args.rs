use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

// Test policy document constants
const READ_BUCKET_A: &str = r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "arn:aws:s3:::bucketA/*"}]}"#;

const READ_BUCKET_B: &str = r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "arn:aws:s3:::bucketB/*"}]}"#;

const ADMIN: &str = r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Action": "*", "Resource": "*"}]}"#;

const EC2_FULL_AND_DESCRIBE: &str = r#"[
    {"Statement": [{"Effect": "Allow", "Action": "ec2:*", "Resource": "*"}]},
    {"Statement": [{"Effect": "Allow", "Action": "ec2:DescribeInstances", "Resource": "i-123"}]}
]"#;

const MALFORMED_ACTION: &str = r#"{"Statement": [{"Effect": "Allow", "Action": "GetObject", "Resource": "*"}]}"#;

const MIXED_WILDCARD: &str = r#"{"Statement": [{"Sid": "Mixed", "Effect": "Allow", "Action": "*", "Resource": ["*", "arn:aws:s3:::bucket"]}]}"#;

fn policy_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write policy file");
    file
}

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("iam-effective-permissions").expect("binary should build");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn help_lists_options() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--role"))
        .stdout(predicate::str::contains("--policy-file"))
        .stdout(predicate::str::contains("--region"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn missing_entity_is_usage_error() {
    cli().assert().failure().code(2);
}

#[test]
fn test_merges_statements_across_files() {
    let a = policy_file(READ_BUCKET_A);
    let b = policy_file(READ_BUCKET_B);

    let output = cli()
        .arg("alice")
        .arg("--policy-file")
        .arg(b.path())
        .arg("--policy-file")
        .arg(a.path())
        .output()
        .expect("failed to run");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "entityType": "User",
            "evaluatedEntity": "alice",
            "permissions": {
                "s3": {"GetObject": ["arn:aws:s3:::bucketA/*", "arn:aws:s3:::bucketB/*"]}
            }
        })
    );
}

#[test]
fn test_output_is_indented_and_key_sorted() {
    let file = policy_file(READ_BUCKET_A);
    let output = cli()
        .args(["deploy", "--role", "--policy-file"])
        .arg(file.path())
        .output()
        .expect("failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("{\n  \"entityType\": \"Role\",\n  \"evaluatedEntity\": \"deploy\","));
}

#[test]
fn test_admin_policy_hides_everything_else() {
    let admin = policy_file(ADMIN);
    let read = policy_file(READ_BUCKET_A);

    let output = cli()
        .arg("admin")
        .arg("--policy-file")
        .arg(read.path())
        .arg("--policy-file")
        .arg(admin.path())
        .output()
        .expect("failed to run");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_json(&output)["permissions"],
        serde_json::json!({"*": "*"})
    );
}

#[test]
fn test_service_blanket_reported_as_wildcard() {
    let file = policy_file(EC2_FULL_AND_DESCRIBE);
    let output = cli()
        .args(["ops", "--role", "--policy-file"])
        .arg(file.path())
        .output()
        .expect("failed to run");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_json(&output)["permissions"],
        serde_json::json!({"ec2": {"*": "*"}})
    );
}

#[test]
fn test_malformed_action_exits_with_input_error() {
    let file = policy_file(MALFORMED_ACTION);
    cli()
        .args(["alice", "--policy-file"])
        .arg(file.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed action 'GetObject'"));
}

#[test]
fn test_error_is_reported_once() {
    let file = policy_file(MALFORMED_ACTION);
    let output = cli()
        .args(["alice", "--policy-file"])
        .arg(file.path())
        .output()
        .expect("failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Malformed action 'GetObject'").count(), 1);
}

#[test]
fn test_mixed_wildcard_resources_are_rejected() {
    let file = policy_file(MIXED_WILDCARD);
    cli()
        .args(["alice", "--policy-file"])
        .arg(file.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Malformed statement 'Mixed'"));
}

#[test]
fn test_missing_policy_file_exits_with_failure() {
    cli()
        .args(["alice", "--policy-file", "/nonexistent/policy.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/policy.json"));
}
