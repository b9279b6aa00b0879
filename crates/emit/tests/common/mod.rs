#![allow(dead_code)]

use emit::{emit_includes, Options};
use layout::Layouts;
use pp::Preprocessor;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write `src` as include/demo.h under a temp dir and run the full
/// pp → parse → layout → emit pipeline over it.
pub fn emit_header(src: &str, opts: Options) -> String {
    let (out, _dir) = emit_header_in_dir(src, opts);
    out
}

pub fn emit_header_in_dir(src: &str, opts: Options) -> (String, TempDir) {
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("include");
    fs::create_dir(&sub).unwrap();
    let path = sub.join("demo.h");
    fs::write(&path, src).unwrap();
    (emit_path(&path, &[], opts), dir)
}

pub fn emit_path(path: &std::path::Path, include_dirs: &[PathBuf], opts: Options) -> String {
    let mut pp = Preprocessor::new();
    let pre = pp.expand_file(path, include_dirs).expect("preprocess ok");
    let tu = parse::parse_translation_unit(&pre.text).expect("parse ok");
    let lay = Layouts::build(&tu).expect("layout ok");
    emit_includes(path, &tu, &lay, &pre, &opts).expect("emit ok")
}
