use pp::{MacroTokKind, Preprocessor};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

fn macros_of(src: &str) -> Vec<pp::MacroDef> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("input.h");
    let mut f = File::create(&path).unwrap();
    f.write_all(src.as_bytes()).unwrap();
    let mut pp = Preprocessor::new();
    pp.expand_file(&path, &[]).unwrap().macros
}

#[test]
fn object_macro_body_tokens_classified() {
    let ms = macros_of("#define SOME_DEFINE 3\n#define ANOTHER_DEFINE 0x33\n");
    assert_eq!(ms.len(), 2);
    assert_eq!(ms[0].name, "SOME_DEFINE");
    assert!(ms[0].params.is_none());
    assert_eq!(ms[0].body.len(), 1);
    assert_eq!(ms[0].body[0].kind, MacroTokKind::Int);
    assert_eq!(ms[0].body[0].text, "3");
    assert_eq!(ms[1].body[0].text, "0x33");
}

#[test]
fn body_keeps_raw_unexpanded_tokens() {
    let ms = macros_of("#define SOME_DEFINE 3\n#define COMBINED (1 << SOME_DEFINE)\n");
    let combined = ms.iter().find(|m| m.name == "COMBINED").unwrap();
    let texts: Vec<&str> = combined.body.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["(", "1", "<", "<", "SOME_DEFINE", ")"]);
}

#[test]
fn space_before_flags_reflect_source_gaps() {
    let ms = macros_of("#define FOO (1u << 40)\n");
    let body = &ms[0].body;
    let flags: Vec<bool> = body.iter().map(|t| t.space_before).collect();
    // ( 1u < < 40 )
    assert_eq!(flags, [false, false, true, false, true, false]);
    assert_eq!(body[1].kind, MacroTokKind::Int);
    assert_eq!(body[1].text, "1u");
}

#[test]
fn string_and_char_bodies_are_not_ints() {
    let ms = macros_of("#define S \"foo\"\n#define C 'x'\n");
    assert_eq!(ms[0].body[0].kind, MacroTokKind::Str);
    assert_eq!(ms[0].body[0].text, "\"foo\"");
    assert_eq!(ms[1].body[0].kind, MacroTokKind::Char);
}

#[test]
fn function_like_macro_records_params() {
    let ms = macros_of("#define MAX(a, b) ((a) > (b) ? (a) : (b))\n");
    assert_eq!(ms[0].params.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
}

#[test]
fn empty_body_macro_recorded() {
    let ms = macros_of("#define GUARD_ONLY\n");
    assert_eq!(ms[0].name, "GUARD_ONLY");
    assert!(ms[0].body.is_empty());
}

#[test]
fn trailing_comment_not_part_of_body() {
    let ms = macros_of("#define N 10 // element count\n");
    assert_eq!(ms[0].body.len(), 1);
    assert_eq!(ms[0].body[0].text, "10");
}
