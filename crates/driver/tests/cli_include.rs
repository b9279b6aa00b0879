use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn included_declarations_are_not_emitted() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("types.h"),
        "typedef unsigned int UINT;\nstruct FromInclude { UINT u; };\n",
    )
    .unwrap();
    let main = dir.path().join("main.h");
    fs::write(
        &main,
        "#include \"types.h\"\nstruct Mine { UINT value; struct FromInclude sub; };\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("amigen").unwrap();
    cmd.arg(main.to_string_lossy().as_ref());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STRUCTURE   Mine,0"))
        .stdout(predicate::str::contains("ULONG   value"))
        .stdout(predicate::str::contains("STRUCT  sub,4"))
        .stdout(predicate::str::contains("STRUCTURE   FromInclude").not());
}

#[test]
fn include_dirs_flag_searched() {
    let dir = tempdir().unwrap();
    let sys = dir.path().join("sys");
    fs::create_dir(&sys).unwrap();
    fs::write(sys.join("size.h"), "#define WIDTH 4\n").unwrap();
    let main = dir.path().join("main.h");
    fs::write(&main, "#include <size.h>\nstruct G { int grid[WIDTH]; };\n").unwrap();

    let mut cmd = Command::cargo_bin("amigen").unwrap();
    cmd.arg("-I").arg(sys.to_string_lossy().as_ref());
    cmd.arg(main.to_string_lossy().as_ref());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STRUCT  grid,4*4"))
        .stdout(predicate::str::contains("WIDTH").not());
}

#[test]
fn missing_include_fails_without_output() {
    let dir = tempdir().unwrap();
    let main = dir.path().join("main.h");
    fs::write(&main, "#include \"gone.h\"\nstruct S { int a; };\n").unwrap();

    let mut cmd = Command::cargo_bin("amigen").unwrap();
    cmd.arg(main.to_string_lossy().as_ref());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("include not found"))
        .stdout(predicate::str::is_empty());
}
