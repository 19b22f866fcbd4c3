//! End-to-end tests for the markforge binary.

mod common;

use anyhow::Result;
use common::write_markdown;
use std::fs;
use std::process::Command;

fn markforge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_markforge"))
}

/// Tests rendering a file to an output document.
#[test]
fn test_render_to_file_e2e() -> Result<()> {
    // Arrange
    let (dir, input) = write_markdown("doc.md", "# Report\n\n- [x] shipped\n")?;
    let output = dir.path().join("doc.html");

    // Act
    let status = markforge()
        .args(["render", "--diagrams", "off", "-o"])
        .arg(&output)
        .arg(&input)
        .status()?;

    // Assert
    assert!(status.success());
    let html = fs::read_to_string(&output)?;
    assert!(html.contains("<title>Report</title>"));
    assert!(html.contains("task-item done"));
    Ok(())
}

/// Tests rendering to stdout with a global flag after the subcommand.
#[test]
fn test_render_to_stdout_e2e() -> Result<()> {
    // Arrange
    let (_dir, input) = write_markdown("doc.md", "Hello")?;

    // Act
    let output = markforge()
        .arg("render")
        .arg(&input)
        .args(["--theme", "github-light"])
        .output()?;

    // Assert
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("<p>Hello</p>"));
    assert!(stdout.contains("#ffffff"));
    Ok(())
}

/// Tests printing the outline as a tree.
#[test]
fn test_outline_e2e() -> Result<()> {
    // Arrange
    let (_dir, input) =
        write_markdown("doc.md", "# A\n## B\n```\n# not a heading\n```\n## C\n")?;

    // Act
    let output = markforge().arg("outline").arg(&input).arg("--tree").output()?;

    // Assert
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "- A (line 1)\n  - B (line 2)\n  - C (line 6)\n"
    );
    Ok(())
}

/// Tests that a missing input file fails validation.
#[test]
fn test_missing_file_fails_e2e() -> Result<()> {
    // Act
    let output = markforge()
        .args(["render", "/definitely/not/here.md"])
        .output()?;

    // Assert
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("does not exist"), "Got: {stderr}");
    Ok(())
}

/// Tests that an unknown code theme is rejected.
#[test]
fn test_unknown_code_theme_e2e() -> Result<()> {
    let (_dir, input) = write_markdown("doc.md", "x")?;
    let status = markforge()
        .arg("render")
        .arg(&input)
        .args(["--code-theme", "nope"])
        .status()?;
    assert!(!status.success());
    Ok(())
}
