use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, run};

const GREETING_TSX: &str = r#"export const Greeting = () => (
  <h1>{t("Welcome, {name}!")}</h1>
  <button>{t('Save')}</button>
);
"#;

const STRINGS_JSON: &str = r#"{
  "@sourceLanguage": "en",
  "Save": { "en": "Save", "ru": "Сохранить" },
  "Old Feature": { "en": "Old Feature" }
}
"#;

const LOCALIZABLE_XCSTRINGS: &str = r#"{
  "sourceLanguage" : "en",
  "strings" : {
    "Old Feature" : {
      "localizations" : {
        "ru" : {
          "stringUnit" : {
            "state" : "needs_review",
            "value" : "Старая функция"
          }
        }
      }
    },
    "Save" : {

    }
  },
  "version" : "1.0"
}
"#;

#[test]
fn test_text_report() -> Result<()> {
    let test = CliTest::with_file("src/Greeting.tsx", GREETING_TSX)?;
    test.write_file("strings.json", STRINGS_JSON)?;

    assert_cmd_snapshot!(test.check_command().args(["--catalog", "strings.json"]), @r#"
    success: false
    exit_code: 7
    ----- stdout -----
    ✘ 1 key missing from catalog
      src/Greeting.tsx:2  "Welcome, {0}!"

    ✘ 1 key missing a translation for 'ru' in strings.json
      "Old Feature"

    ✘ 1 stale key in strings.json
      "Old Feature"

    ✘ 3 problems (1 missing from catalog, 1 missing translation, 1 stale)

    ----- stderr -----
    "#);

    Ok(())
}

#[test]
fn test_clean_project_exits_zero() -> Result<()> {
    let test = CliTest::with_file("Sources/App.swift", "Button(\"Save\") { save() }\n")?;
    test.write_file(
        "Localizable.xcstrings",
        r#"{
  "sourceLanguage" : "en",
  "strings" : {
    "Save" : {
      "localizations" : {
        "ru" : {
          "stringUnit" : {
            "state" : "translated",
            "value" : "Сохранить"
          }
        }
      }
    }
  },
  "version" : "1.0"
}
"#,
    )?;

    assert_cmd_snapshot!(test.check_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✓ 0 keys missing a translation for 'ru' in Localizable.xcstrings

    ✓ 0 stale keys in Localizable.xcstrings

    ✓ Checked 1 source file against Localizable.xcstrings (1 entry) - no issues found

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_missing_translation_and_stale_bits() -> Result<()> {
    let test = CliTest::with_file("Sources/App.swift", "Button(\"Save\") { save() }\n")?;
    test.write_file("Localizable.xcstrings", LOCALIZABLE_XCSTRINGS)?;

    assert_cmd_snapshot!(test.check_command().args(["--locale", "ru"]), @r#"
    success: false
    exit_code: 6
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✘ 2 keys missing a translation for 'ru' in Localizable.xcstrings
      "Old Feature"
      "Save"

    ✘ 1 stale key in Localizable.xcstrings
      "Old Feature"

    ✘ 3 problems (0 missing from catalog, 2 missing translations, 1 stale)

    ----- stderr -----
    "#);

    // Reporting never touches the catalog.
    assert_eq!(test.read_file("Localizable.xcstrings")?, LOCALIZABLE_XCSTRINGS);

    Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
    let test = CliTest::with_file("src/Greeting.tsx", GREETING_TSX)?;
    test.write_file("strings.json", STRINGS_JSON)?;

    let mut cmd = test.check_command();
    cmd.args(["--catalog", "strings.json", "--format", "json"]);
    let output = run(cmd)?;
    let report: Value = serde_json::from_str(&output.stdout)?;

    assert_eq!(output.code, Some(7));
    assert_eq!(report["exitCode"], 7);
    assert_eq!(report["sourceLocale"], "en");
    assert_eq!(report["locales"], serde_json::json!(["ru"]));
    assert_eq!(report["filesScanned"], 1);
    assert_eq!(report["catalogEntries"], 2);
    assert_eq!(report["counts"]["stale"], 1);
    assert_eq!(report["missingFromCatalog"][0]["key"], "Welcome, {0}!");
    assert_eq!(
        report["missingFromCatalog"][0]["references"][0],
        serde_json::json!({
            "file": "src/Greeting.tsx",
            "line": 2,
            "key": "Welcome, {0}!",
            "raw": "Welcome, {name}!"
        })
    );
    assert_eq!(report["missingTranslation"]["ru"], serde_json::json!(["Old Feature"]));
    assert_eq!(report["stale"], serde_json::json!(["Old Feature"]));

    Ok(())
}

#[test]
fn test_invalid_locale_is_fatal() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "t('Save')\n")?;
    test.write_file("strings.json", STRINGS_JSON)?;

    assert_cmd_snapshot!(
        test.check_command()
            .args(["--catalog", "strings.json", "--locale", "xx-??"]),
        @r"
    success: false
    exit_code: 8
    ----- stdout -----

    ----- stderr -----
    Error: invalid locale code 'xx-??'
    "
    );

    Ok(())
}

#[test]
fn test_missing_root_is_fatal() -> Result<()> {
    let test = CliTest::with_file("strings.json", STRINGS_JSON)?;

    test.settings().bind(|| {
        assert_cmd_snapshot!(
            test.check_command()
                .args(["--catalog", "strings.json", "--root", "does-not-exist"]),
            @r"
        success: false
        exit_code: 8
        ----- stdout -----

        ----- stderr -----
        Error: cannot read '[ROOT]/does-not-exist': No such file or directory (os error 2)
        "
        );
    });

    Ok(())
}

#[test]
fn test_malformed_catalog_is_fatal() -> Result<()> {
    let test = CliTest::with_file("Sources/App.swift", "Text(\"Hello\")\n")?;
    test.write_file(
        "Localizable.xcstrings",
        r#"{ "sourceLanguage" : "en", "strings" : { "Hello" : "Hi" } }"#,
    )?;

    test.settings().bind(|| {
        assert_cmd_snapshot!(test.check_command(), @r#"
        success: false
        exit_code: 8
        ----- stdout -----

        ----- stderr -----
        Error: malformed catalog '[ROOT]/Localizable.xcstrings': entry "Hello" must be an object, found a string
        "#);
    });

    Ok(())
}

#[test]
fn test_missing_catalog_is_fatal_without_fix() -> Result<()> {
    let test = CliTest::with_file("Sources/App.swift", "Text(\"Hello\")\n")?;

    test.settings().bind(|| {
        assert_cmd_snapshot!(test.check_command(), @r"
        success: false
        exit_code: 8
        ----- stdout -----

        ----- stderr -----
        Error: cannot read '[ROOT]/Localizable.xcstrings': No such file or directory (os error 2)
        ");
    });
    assert!(!test.root().join("Localizable.xcstrings").exists());

    Ok(())
}

#[test]
fn test_config_file_settings() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locauditrc.json",
        r#"{
  "root": "web",
  "catalog": "i18n/strings.json",
  "locales": ["de"],
  "ignores": ["**/generated/**"]
}"#,
    )?;
    test.write_file("web/app.ts", "t('Save')\n")?;
    test.write_file("web/generated/strings.ts", "t('Generated')\n")?;
    test.write_file("Sources/App.swift", "Text(\"Outside root\")\n")?;
    // Only "de" is audited, so the untranslated "ru" unit does not count.
    test.write_file(
        "i18n/strings.json",
        r#"{ "Save": { "en": "Save", "de": "Speichern", "ru": null } }"#,
    )?;

    assert_cmd_snapshot!(test.check_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✓ 0 keys missing a translation for 'de' in i18n/strings.json

    ✓ 0 stale keys in i18n/strings.json

    ✓ Checked 1 source file against i18n/strings.json (1 entry) - no issues found

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_custom_extractor_pattern_warning() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".locauditrc.json",
        r#"{
  "catalog": "strings.json",
  "extractors": [
    "javascript",
    { "name": "lua", "extensions": ["lua"], "patterns": ["L\\(\"([^\"]+)\"\\)"] }
  ]
}"#,
    )?;
    test.write_file("app.js", "t('Save')\n")?;
    test.write_file("strings.json", r#"{ "Save": { "en": "Save" } }"#)?;

    assert_cmd_snapshot!(test.check_command(), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✓ 0 keys missing a translation (no target locales)

    ✓ 0 stale keys in strings.json

    ✓ Checked 1 source file against strings.json (1 entry) - no issues found

    ----- stderr -----
    warning: extractor 'lua' pattern #1 matched no files (0 file(s) with extensions lua): L\("([^"]+)"\)
    "#);

    Ok(())
}

#[test]
fn test_undecodable_file_warning_is_summarised() -> Result<()> {
    let test = CliTest::with_file("app.js", "t('Save')\n")?;
    test.write_file("strings.json", r#"{ "Save": { "en": "Save" } }"#)?;
    std::fs::write(test.root().join("blob.js"), [0xff, 0xfe, 0x00, 0x74])?;

    assert_cmd_snapshot!(test.check_command().args(["--catalog", "strings.json"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 0 keys missing from catalog

    ✓ 0 keys missing a translation (no target locales)

    ✓ 0 stale keys in strings.json

    ✓ Checked 2 source files against strings.json (1 entry) - no issues found

    ----- stderr -----
    warning: 1 file(s) could not be read (use -v for details)
    ");

    let mut cmd = test.check_command();
    cmd.args(["--catalog", "strings.json", "-v"]);
    let verbose = run(cmd)?;
    assert_eq!(verbose.stderr, "warning: blob.js: skipped: not valid UTF-8\n");

    Ok(())
}

#[test]
fn test_duplicate_catalog_key_warns_and_survives_fix() -> Result<()> {
    let catalog = r#"{
  "Save": {
    "en": "Save",
    "ru": "Сохранить"
  },
  "Save": {
    "en": "Save"
  }
}
"#;
    let test = CliTest::with_file("app.js", "t('Save')\nt('Open')\n")?;
    test.write_file("strings.json", catalog)?;

    assert_cmd_snapshot!(test.check_command().args(["--catalog", "strings.json", "--fix"]), @r#"
    success: false
    exit_code: 3
    ----- stdout -----
    ✘ 1 key missing from catalog
      app.js:2  "Open"

    ✘ 1 key missing a translation for 'ru' in strings.json
      "Save"

    ✓ 0 stale keys in strings.json

    Added 1 entry to strings.json
    ✘ 2 problems (1 missing from catalog, 1 missing translation, 0 stale)

    ----- stderr -----
    warning: catalog key "Save" appears more than once; using the last one
    "#);

    // Both copies of "Save" are written back, the new entry goes last.
    assert_eq!(
        test.read_file("strings.json")?,
        r#"{
  "Save": {
    "en": "Save",
    "ru": "Сохранить"
  },
  "Save": {
    "en": "Save"
  },
  "Open": {
    "en": {
      "state": "untranslated",
      "value": "Open"
    }
  }
}
"#
    );

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("--help"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    A fast CLI tool for auditing localization catalogs against source code

    Usage: locaudit [COMMAND]

    Commands:
      check  Report missing, untranslated and stale keys
      init   Initialize a new .locauditrc.json configuration file
      help   Print this message or the help of the given subcommand(s)

    Options:
      -h, --help     Print help
      -V, --version  Print version

    ----- stderr -----
    ");

    Ok(())
}
