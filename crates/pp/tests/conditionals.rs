use pp::Preprocessor;
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

fn expand(src: &str) -> String {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.h");
    let mut f = File::create(&path).unwrap();
    f.write_all(src.as_bytes()).unwrap();
    let mut pp = Preprocessor::new();
    pp.expand_file(&path, &[]).unwrap().text
}

#[test]
fn ifndef_guard_keeps_body() {
    let src = "#ifndef GUARD_H\n#define GUARD_H\nint kept;\n#endif\n";
    assert!(expand(src).contains("int kept;"));
}

#[test]
fn ifdef_without_definition_drops_body() {
    let src = "#ifdef MISSING\nint dropped;\n#endif\nint kept;\n";
    let out = expand(src);
    assert!(!out.contains("dropped"));
    assert!(out.contains("int kept;"));
}

#[test]
fn if_defined_else_branches() {
    let src = "#define A 1\n#if defined(A)\nint yes;\n#else\nint no;\n#endif\n";
    let out = expand(src);
    assert!(out.contains("int yes;"));
    assert!(!out.contains("int no;"));
}

#[test]
fn if_value_comparison() {
    let src = "#define V 3\n#if V > 2\nint big;\n#endif\n#if V > 5\nint huge;\n#endif\n";
    let out = expand(src);
    assert!(out.contains("int big;"));
    assert!(!out.contains("huge"));
}

#[test]
fn nested_inactive_blocks_stay_inactive() {
    let src = "#ifdef MISSING\n#ifdef ALSO_MISSING\nint a;\n#else\nint b;\n#endif\nint c;\n#endif\n";
    let out = expand(src);
    assert!(!out.contains("int a;"));
    assert!(!out.contains("int b;"));
    assert!(!out.contains("int c;"));
}

#[test]
fn error_directive_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.h");
    let mut f = File::create(&path).unwrap();
    f.write_all(b"#error unsupported target\n").unwrap();
    let mut pp = Preprocessor::new();
    let res = pp.expand_file(&path, &[]);
    assert!(res.is_err());
}
