use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, run};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["root"], "./");
    assert_eq!(parsed["catalog"], "Localizable.xcstrings");
    assert_eq!(
        parsed["extractors"],
        serde_json::json!(["swift", "javascript", "android"])
    );
    assert!(
        parsed.get("ignores").is_some(),
        "Config should have 'ignores' field"
    );
    assert!(
        content.contains("\n  \"catalog\""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .locauditrc.json

    ----- stderr -----
    ");
    assert!(test.root().join(".locauditrc.json").exists());

    let content = test.read_file(".locauditrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".locauditrc.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 8
    ----- stdout -----

    ----- stderr -----
    Error: .locauditrc.json already exists
    ");
    assert_eq!(test.read_file(".locauditrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_generated_config_is_accepted_by_check() -> Result<()> {
    let test = CliTest::with_file("Sources/App.swift", "Text(\"Hello\")\n")?;
    test.write_file("Localizable.xcstrings", "{\n  \"sourceLanguage\" : \"en\",\n  \"strings\" : {\n    \"Hello\" : {\n\n    }\n  },\n  \"version\" : \"1.0\"\n}\n")?;

    let mut cmd = test.command();
    cmd.arg("init");
    assert_eq!(run(cmd)?.code, Some(0));

    let output = run(test.check_command())?;
    assert_eq!(output.code, Some(0), "stdout:\n{}", output.stdout);

    Ok(())
}
