use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const HEADER: &str = r#"
// This struct has alignment padding
struct StructWithAlignPad
{
    char    a_byte;         // one byte = odd size
    short   a_word;         // one word = needs alignment
    int     a_long;         // one longword = already word aligned
};

// A simple enum

enum SimpleEnum
{
    EnumValue0,             /* The first enum */
    EnumValue1,
    EnumValue400 = 400,     /* Specific value */
    EnumValue401,
};

#define SOME_DEFINE 3
#define ANOTHER_DEFINE 0x33
#define COMBINED_DEFINE (1 << SOME_DEFINE)
"#;

fn run_on(header: &str) -> assert_cmd::assert::Assert {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("hw");
    fs::create_dir(&sub).unwrap();
    let file_path = sub.join("registers.h");
    fs::write(&file_path, header).unwrap();
    let mut cmd = Command::cargo_bin("amigen").unwrap();
    cmd.arg(file_path.to_string_lossy().as_ref());
    cmd.assert()
}

#[test]
fn generated_header_and_guard() {
    run_on(HEADER)
        .success()
        .stdout(predicate::str::contains(
            "; This file is GENERATED from registers.h using amigen. Edits will be LOST!",
        ))
        .stdout(predicate::str::contains("IFND    HW_REGISTERS_I"))
        .stdout(predicate::str::contains("HW_REGISTERS_I SET 1"))
        .stdout(predicate::str::contains("ENDC    ; HW_REGISTERS_I"))
        .stdout(predicate::str::contains("INCLUDE \"exec/types.i\""));
}

#[test]
fn struct_block_with_padding_and_comments() {
    run_on(HEADER)
        .success()
        .stdout(predicate::str::contains(";// This struct has alignment padding"))
        .stdout(predicate::str::contains("STRUCTURE   StructWithAlignPad,0"))
        .stdout(predicate::str::contains("BYTE    a_byte"))
        .stdout(predicate::str::contains("ALIGNWORD"))
        .stdout(predicate::str::contains("WORD    a_word"))
        .stdout(predicate::str::contains("LONG    a_long"))
        .stdout(predicate::str::contains("; one byte = odd size"))
        .stdout(predicate::str::contains("StructWithAlignPad_sizeof"))
        .stdout(predicate::str::contains("; 8 bytes"));
}

#[test]
fn enum_block_with_runs() {
    run_on(HEADER)
        .success()
        .stdout(predicate::str::contains("; enum SimpleEnum"))
        .stdout(predicate::str::contains("EITEM   EnumValue0"))
        .stdout(predicate::str::contains("ENUM    400"))
        .stdout(predicate::str::contains("EITEM   EnumValue401"))
        .stdout(predicate::str::contains("; end of enum SimpleEnum"));
}

#[test]
fn define_lines() {
    run_on(HEADER)
        .success()
        .stdout(predicate::str::contains("SOME_DEFINE              EQU 3"))
        .stdout(predicate::str::contains("ANOTHER_DEFINE           EQU $33"))
        .stdout(predicate::str::contains("EQU (1 << SOME_DEFINE)"));
}

#[test]
fn output_is_deterministic() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("test.h");
    fs::write(&file_path, HEADER).unwrap();
    let out1 = Command::cargo_bin("amigen")
        .unwrap()
        .arg(file_path.to_string_lossy().as_ref())
        .output()
        .unwrap();
    let out2 = Command::cargo_bin("amigen")
        .unwrap()
        .arg(file_path.to_string_lossy().as_ref())
        .output()
        .unwrap();
    assert!(out1.status.success());
    assert_eq!(out1.stdout, out2.stdout);
}
