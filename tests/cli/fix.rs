use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;

use crate::CliTest;

const STRINGS_JSON: &str = r#"{
  "Save": {
    "en": "Save",
    "ru": "Сохранить"
  }
}
"#;

#[test]
fn test_fix_appends_untranslated_entries() -> Result<()> {
    let test = CliTest::with_file("app.js", "t('Save')\nt('Cancel')\n")?;
    test.write_file("strings.json", STRINGS_JSON)?;

    // The report describes the catalog as it was before the fix.
    assert_cmd_snapshot!(test.check_command().args(["--catalog", "strings.json", "--fix"]), @r#"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ 1 key missing from catalog
      app.js:2  "Cancel"

    ✓ 0 keys missing a translation for 'ru' in strings.json

    ✓ 0 stale keys in strings.json

    Added 1 entry to strings.json
    ✘ 1 problem (1 missing from catalog, 0 missing translations, 0 stale)

    ----- stderr -----
    "#);

    assert_eq!(
        test.read_file("strings.json")?,
        r#"{
  "Save": {
    "en": "Save",
    "ru": "Сохранить"
  },
  "Cancel": {
    "en": {
      "state": "untranslated",
      "value": "Cancel"
    }
  }
}
"#
    );

    // The new entry now needs a Russian translation.
    assert_cmd_snapshot!(test.check_command().args(["--catalog", "strings.json"]), @r#"
    success: false
    exit_code: 2
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✘ 1 key missing a translation for 'ru' in strings.json
      "Cancel"

    ✓ 0 stale keys in strings.json

    ✘ 1 problem (0 missing from catalog, 1 missing translation, 0 stale)

    ----- stderr -----
    "#);

    Ok(())
}

#[test]
fn test_fix_creates_missing_catalog() -> Result<()> {
    let test = CliTest::with_file("Sources/Greeting.swift", "Text(\"Hello \\(name)\")\n")?;

    assert_cmd_snapshot!(test.check_command().arg("--fix"), @r#"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ 1 key missing from catalog
      Sources/Greeting.swift:1  "Hello {0}"

    ✓ 0 keys missing a translation (no target locales)

    ✓ 0 stale keys in Localizable.xcstrings

    Added 1 entry to Localizable.xcstrings
    ✘ 1 problem (1 missing from catalog, 0 missing translations, 0 stale)

    ----- stderr -----
    "#);

    // Xcode spells the interpolation as %@.
    assert_eq!(
        test.read_file("Localizable.xcstrings")?,
        r#"{
  "sourceLanguage" : "en",
  "strings" : {
    "Hello %@" : {
      "localizations" : {
        "en" : {
          "stringUnit" : {
            "state" : "new",
            "value" : "Hello %@"
          }
        }
      }
    }
  },
  "version" : "1.0"
}
"#
    );

    assert_cmd_snapshot!(test.check_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✓ 0 keys missing a translation (no target locales)

    ✓ 0 stale keys in Localizable.xcstrings

    ✓ Checked 1 source file against Localizable.xcstrings (1 entry) - no issues found

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_fix_with_output_leaves_input_untouched() -> Result<()> {
    let test = CliTest::with_file("app.js", "t('Save')\nt('Cancel')\n")?;
    test.write_file("strings.json", STRINGS_JSON)?;

    assert_cmd_snapshot!(
        test.check_command().args([
            "--catalog",
            "strings.json",
            "--fix",
            "--output",
            "out/strings.json",
        ]),
        @r#"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ 1 key missing from catalog
      app.js:2  "Cancel"

    ✓ 0 keys missing a translation for 'ru' in strings.json

    ✓ 0 stale keys in strings.json

    Added 1 entry to out/strings.json
    ✘ 1 problem (1 missing from catalog, 0 missing translations, 0 stale)

    ----- stderr -----
    "#
    );

    assert_eq!(test.read_file("strings.json")?, STRINGS_JSON);
    assert!(test.read_file("out/strings.json")?.contains("\"Cancel\""));

    Ok(())
}

#[test]
fn test_fix_without_missing_keys_does_not_rewrite() -> Result<()> {
    // Non-canonical spacing would be reformatted by a rewrite.
    let catalog = r#"{ "Save": { "en": "Save" } }"#;
    let test = CliTest::with_file("app.js", "t('Save')\n")?;
    test.write_file("strings.json", catalog)?;

    assert_cmd_snapshot!(test.check_command().args(["--catalog", "strings.json", "--fix"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✓ 0 keys missing a translation (no target locales)

    ✓ 0 stale keys in strings.json

    No entries to add
    ✓ Checked 1 source file against strings.json (1 entry) - no issues found

    ----- stderr -----
    ");
    assert_eq!(test.read_file("strings.json")?, catalog);

    Ok(())
}
