use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn help_shows_usage() {
    let mut cmd = Command::cargo_bin("amigen").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("assembler include"));
}

#[test]
fn simple_struct_converts() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("test.h");
    let mut f = File::create(&file_path).unwrap();
    writeln!(f, "struct Point {{ short x; short y; }};").unwrap();

    let mut cmd = Command::cargo_bin("amigen").unwrap();
    cmd.arg(file_path.to_string_lossy().as_ref());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STRUCTURE   Point,0"))
        .stdout(predicate::str::contains("WORD    x"))
        .stdout(predicate::str::contains("Point_sizeof"))
        .stdout(predicate::str::contains("; 4 bytes"));
}

#[test]
fn define_passed_on_command_line_expands() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("test.h");
    let mut f = File::create(&file_path).unwrap();
    writeln!(f, "struct Buf {{ char data[COUNT]; }};").unwrap();

    let mut cmd = Command::cargo_bin("amigen").unwrap();
    cmd.args(["-D", "COUNT=6"]);
    cmd.arg(file_path.to_string_lossy().as_ref());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STRUCT  data,6*1"));
}
