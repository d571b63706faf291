use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const HEADER: &str = "\
AFIO_V2_NAMESPACE_BEGIN

class AFIO_DECL widget : public handle
{
public:
  //! Current size
  AFIO_MAKE_FREE_FUNCTION
  result<extent_type> length() const noexcept;
};

AFIO_V2_NAMESPACE_END
";

fn freefn() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_freefn"));
    cmd.env_remove("FREEFN_CONFIG")
        .env_remove("FREEFN_ROOT")
        .env_remove("FREEFN_MARKER")
        .env_remove("FREEFN_NAMESPACE_END")
        .env_remove("FREEFN_TAB_WIDTH")
        .env_remove("FREEFN_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// A source tree with one header where the default globs find it
fn tree() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let header = dir.path().join("include/afio/v2.0/widget.hpp");
    fs::create_dir_all(header.parent().unwrap()).unwrap();
    fs::write(&header, HEADER).unwrap();
    (dir, header)
}

fn root_arg(dir: &Path) -> String {
    dir.display().to_string()
}

#[test]
fn free_rewrites_discovered_headers() {
    let (dir, header) = tree();

    freefn()
        .args(["-C", &root_arg(dir.path()), "free"])
        .assert()
        .success()
        .stdout(predicate::str::contains("changed: "))
        .stdout(predicate::str::contains("1 of 1 file(s) changed, 1 function(s) freed"));

    let text = fs::read_to_string(&header).unwrap();
    assert!(text.contains(
        "//! Current size\ninline result<widget::extent_type> length(const widget &self) noexcept\n{\n  return self.length();\n}\n"
    ));

    // Second run has nothing to do
    freefn()
        .args(["-C", &root_arg(dir.path()), "free"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 1 file(s) changed"));
    assert_eq!(fs::read_to_string(&header).unwrap(), text);
}

#[test]
fn check_reports_stale_headers_without_writing() {
    let (dir, header) = tree();

    freefn()
        .args(["-C", &root_arg(dir.path()), "free", "--check"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("+++"))
        .stdout(predicate::str::contains("would change"));
    assert_eq!(fs::read_to_string(&header).unwrap(), HEADER);

    freefn()
        .args(["-C", &root_arg(dir.path()), "free"])
        .assert()
        .success();
    freefn()
        .args(["-C", &root_arg(dir.path()), "free", "--check"])
        .assert()
        .success();
}

#[test]
fn dry_run_leaves_files_alone() {
    let (dir, header) = tree();

    freefn()
        .args(["-C", &root_arg(dir.path()), "free", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+// BEGIN make_free_functions.py"));
    assert_eq!(fs::read_to_string(&header).unwrap(), HEADER);
}

#[test]
fn json_output_describes_the_run() {
    let (dir, _header) = tree();

    let output = freefn()
        .args(["-C", &root_arg(dir.path()), "free", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["transformation_type"], "free_functions");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["statistics"]["files_modified"], 1);
    assert_eq!(value["changes"][0]["functions_freed"][0]["name"], "length");
    assert_eq!(value["changes"][0]["functions_freed"][0]["is_static"], false);
}

#[test]
fn explicit_header_relative_to_root_with_orig_backup() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("widget.hpp"), HEADER).unwrap();

    freefn()
        .args([
            "-C",
            &root_arg(dir.path()),
            "free",
            "widget.hpp",
            "--backup",
            "orig",
        ])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dir.path().join("widget.hpp.orig")).unwrap(), HEADER);
    assert!(fs::read_to_string(dir.path().join("widget.hpp"))
        .unwrap()
        .contains("// END make_free_functions.py"));
}

#[test]
fn marker_override_from_command_line() {
    let dir = tempdir().unwrap();
    let header = dir.path().join("widget.hpp");
    fs::write(&header, HEADER.replace("AFIO_MAKE_FREE_FUNCTION", "LLFIO_MAKE_FREE_FUNCTION")).unwrap();

    freefn()
        .args([
            "-C",
            &root_arg(dir.path()),
            "free",
            "widget.hpp",
            "--marker",
            "LLFIO_MAKE_FREE_FUNCTION",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 function(s) freed"));
}

#[test]
fn missing_anchor_fails_with_context() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("widget.hpp"),
        HEADER.replace("AFIO_V2_NAMESPACE_END", "}"),
    )
    .unwrap();

    freefn()
        .args(["-C", &root_arg(dir.path()), "free", "widget.hpp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AFIO_V2_NAMESPACE_END"));
}

#[test]
fn config_file_is_discovered_in_root() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("freefn.toml"),
        "[free_functions]\nmarker = \"MAKE_FREE\"\n\n[tabs]\ntab_width = 2\n",
    )
    .unwrap();

    freefn()
        .args(["-C", &root_arg(dir.path()), "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marker = \"MAKE_FREE\""))
        .stdout(predicate::str::contains("tab_width = 2"));
}

#[test]
fn config_prints_defaults() {
    let dir = tempdir().unwrap();

    freefn()
        .args(["-C", &root_arg(dir.path()), "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marker = \"AFIO_MAKE_FREE_FUNCTION\""))
        .stdout(predicate::str::contains("[tabs]"));
}

#[test]
fn expand_tabs_keeps_originals() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.cpp"), "int x;\n\tint y;\n").unwrap();
    fs::write(dir.path().join("b.hpp"), "no tabs\n").unwrap();
    fs::write(dir.path().join("c.txt"), "\tignored\n").unwrap();

    freefn()
        .args(["-C", &root_arg(dir.path()), "expand-tabs", "--tab-width", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 file(s) changed"));

    assert_eq!(fs::read_to_string(dir.path().join("a.cpp")).unwrap(), "int x;\n  int y;\n");
    assert_eq!(fs::read_to_string(dir.path().join("a.cpp.orig")).unwrap(), "int x;\n\tint y;\n");
    assert!(!dir.path().join("b.hpp.orig").exists());
    assert_eq!(fs::read_to_string(dir.path().join("c.txt")).unwrap(), "\tignored\n");
}

#[test]
fn expand_tabs_extension_override() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("c.txt"), "\tx\n").unwrap();

    freefn()
        .args(["-C", &root_arg(dir.path()), "expand-tabs", "--ext", "txt"])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(dir.path().join("c.txt")).unwrap(), "    x\n");
}

#[test]
fn completions_are_generated() {
    freefn()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("freefn"));
}

#[test]
fn unknown_log_level_is_rejected() {
    freefn()
        .args(["--log-level", "loud", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loud"));
}
