use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const PAGE: &str = r#"---
title: Notes
bibliography:
  Lee1975:
    authors: ["Lee, J.", "Berg, P."]
    year: 1975
---
See [[Lee1975]] and [[Draft2030]].
"#;

#[test]
fn render_writes_resolved_page() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("page.md"), PAGE)?;

    #[allow(deprecated)]
    Command::cargo_bin("pagepress")?
        .current_dir(dir.path())
        .args(["render", "page.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "See [Lee and Berg (1975)](#Lee1975){: .bibliography-reference} and [[Draft2030]].",
        ))
        .stdout(predicate::str::contains("<li id=\"Lee1975\">"));

    Ok(())
}

#[test]
fn render_to_output_file_with_config() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("page.md"), PAGE)?;
    fs::write(
        dir.path().join("pagepress.yml"),
        "locale: fr\ncitations:\n  append_bibliography: false\n",
    )?;

    #[allow(deprecated)]
    Command::cargo_bin("pagepress")?
        .current_dir(dir.path())
        .args(["render", "page.md", "--output", "out.md"])
        .assert()
        .success();

    let out = fs::read_to_string(dir.path().join("out.md"))?;
    assert_eq!(
        out,
        "See [Lee et Berg (1975)](#Lee1975){: .bibliography-reference} and [[Draft2030]].\n"
    );
    Ok(())
}

#[test]
fn check_reports_unresolved_as_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let pages = dir.path().join("pages");
    fs::create_dir_all(pages.join("nested"))?;
    fs::write(pages.join("a.md"), PAGE)?;
    fs::write(pages.join("nested").join("b.markdown"), "No citations.")?;
    fs::write(pages.join("ignored.txt"), "[[Nope]]")?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("pagepress")?
        .current_dir(dir.path())
        .args(["check", "pages", "--json"])
        .assert()
        .success();

    let summary: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(summary["pages"], 2);
    assert_eq!(summary["citations"], 1);
    assert_eq!(summary["unresolved"], 1);
    assert_eq!(summary["diagnostics"][0]["code"], "citation.unresolved");
    Ok(())
}

#[test]
fn check_fails_in_strict_mode() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("page.md"), PAGE)?;
    fs::write(dir.path().join("pagepress.yml"), "strict: true\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("pagepress")?
        .current_dir(dir.path())
        .args(["check", "page.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unresolved citation"));

    Ok(())
}

#[test]
fn unknown_config_locale_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("page.md"), PAGE)?;
    fs::write(dir.path().join("pagepress.yml"), "locale: de\n")?;

    #[allow(deprecated)]
    Command::cargo_bin("pagepress")?
        .current_dir(dir.path())
        .args(["render", "page.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));

    Ok(())
}

#[test]
fn name_command_shows_parts() -> Result<(), Box<dyn std::error::Error>> {
    #[allow(deprecated)]
    let assert = Command::cargo_bin("pagepress")?
        .args(["name", "van der Berg, Jr, Paul", "--json"])
        .assert()
        .success();

    let report: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(report["parsed"], true);
    assert_eq!(report["name"]["von"], "van der");
    assert_eq!(report["surname_form"], "van der Berg, Jr");
    assert_eq!(report["full_name"], "Paul van der Berg, Jr");
    Ok(())
}

#[test]
fn render_logs_diagnostics_at_their_severity() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("page.md"),
        "---\nbibliography:\n  Smith1990:\n    authors: [\"J.Smith\"]\n    year: 1990\n---\n[[Smith1990]] [[Draft2030]]\n",
    )?;

    #[allow(deprecated)]
    let assert = Command::cargo_bin("pagepress")?
        .current_dir(dir.path())
        .args(["render", "page.md"])
        .assert()
        .success();

    let stderr = String::from_utf8(assert.get_output().stderr.clone())?;
    let line_for = |code: &str| {
        stderr
            .lines()
            .find(|l| l.contains(code))
            .map(str::to_string)
            .unwrap_or_default()
    };
    let unparsed = line_for("citation.unparsed_author");
    assert!(unparsed.contains("INFO"), "{stderr}");
    assert!(!unparsed.contains("WARN"), "{stderr}");
    assert!(line_for("citation.unresolved").contains("WARN"), "{stderr}");
    Ok(())
}
