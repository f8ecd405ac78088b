// We use assert_cmd for spawning the compiled binary and
// capturing stdout/stderr in a platform-agnostic way.
use assert_cmd::prelude::*;
use std::process::Command;
// Temporary on-disk fixtures and file assertions
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

mod util;
use util::make_module_fixture;

fn typegen() -> Command
{
    let mut cmd = Command::cargo_bin("typegen").expect("bin");
    // Keep the environment from leaking config into the run
    cmd.env_remove("TYPEGEN_LOG");
    cmd
}

#[test]
fn generate_to_stdout_with_filters()
{
    let tmp = make_module_fixture();

    typegen()
        .current_dir(tmp.path())
        .args(["generate", "--pkg-dir", "pkg", "--include", "^foo/", "--include-type", "Req$", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("// Code generated by typegen. DO NOT EDIT."))
        .stdout(predicate::str::contains("export interface foo_FooReq {"))
        .stdout(predicate::str::contains("export interface foo_Bar {"))
        .stdout(predicate::str::contains("foo_FooRes").not())
        .stdout(predicate::str::contains("baz_Other").not())
        .stdout(predicate::str::contains("Transaction").not());
}

#[test]
fn generate_to_file_creates_parent_dirs()
{
    let tmp = make_module_fixture();

    typegen()
        .current_dir(tmp.path())
        .args(["generate", "--pkg-dir", "pkg", "--out-file", "web/types/index.d.ts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote"));

    tmp.child("web/types/index.d.ts")
        .assert(predicate::str::contains("export interface baz_Other {"));
}

#[test]
fn dash_output_means_stdout_and_quiet_silences_status()
{
    let tmp = make_module_fixture();

    typegen()
        .current_dir(tmp.path())
        .args(["generate", "--pkg-dir", "pkg", "--out", "-", "--quiet", "--strip-prefix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("export interface FooReq {"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn missing_pkg_dir_fails_with_configuration_error()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    typegen()
        .current_dir(tmp.path())
        .args(["generate", "--stdout", "--no-color"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("pkg dir is required"));
}

#[test]
fn invalid_regex_fails_without_output()
{
    let tmp = make_module_fixture();

    typegen()
        .current_dir(tmp.path())
        .args(["generate", "--pkg-dir", "pkg", "--include-type", "(", "--out", "out.d.ts", "--no-color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid include-type pattern"));

    tmp.child("out.d.ts")
        .assert(predicate::path::missing());
}

#[test]
fn config_file_and_preset_drive_generation()
{
    let tmp = make_module_fixture();
    tmp.child("typegen.toml")
        .write_str(
            "[generate]\npkg_dir = \"pkg\"\n\n[presets.reqs]\ninclude = \"^foo/\"\ninclude_type = \"Req$\"\n",
        )
        .expect("write config");

    typegen()
        .current_dir(tmp.path())
        .args(["generate", "--preset", "reqs", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo_FooReq"))
        .stdout(predicate::str::contains("baz_Other").not());

    typegen()
        .current_dir(tmp.path())
        .args(["generate", "--preset", "missing", "--stdout", "--no-color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset"));
}

#[test]
fn packages_lists_discovered_packages_as_json()
{
    let tmp = make_module_fixture();

    let assert = typegen()
        .current_dir(tmp.path())
        .args(["packages", "--pkg-dir", "pkg", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(
        assert
            .get_output()
            .stdout
            .clone(),
    )
    .expect("utf8");
    let v: Value = serde_json::from_str(&stdout).expect("json");
    let paths: Vec<&str> = v
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["import_path"].as_str())
        .collect();
    assert_eq!(paths, vec!["example.com/test/pkg/baz", "example.com/test/pkg/foo"]);
}

#[test]
fn init_writes_config_once()
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    typegen()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp.child("typegen.toml")
        .assert(predicate::str::contains("[generate]"));

    typegen()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn completions_print_to_stdout()
{
    typegen()
        .args(["completions", "bash", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("typegen"));
}
