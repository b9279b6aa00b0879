use anyhow::{anyhow, bail, Context, Result};
use layout::{enum_values, Layouts, Resolved};
use parse::ast::{EnumDef, Member, RecordDef, RecordKind, TranslationUnit, Type};
use pp::{Expanded, MacroDef, MacroTokKind};
use std::fmt::Write as _;
use std::path::Path;

pub const GENERATOR: &str = "amigen";

/// Emission options, threaded explicitly instead of living in process state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub gen_tests: bool,
}

/// Render the assembler include text for every struct, enum and macro
/// constant declared in the primary input file.
pub fn emit_includes(
    input: &Path,
    tu: &TranslationUnit,
    lay: &Layouts,
    pre: &Expanded,
    opts: &Options,
) -> Result<String> {
    let mut em = Emitter {
        lay,
        out: String::new(),
    };

    let file_name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let _ = writeln!(
        em.out,
        "; This file is GENERATED from {} using {}. Edits will be LOST!\n",
        file_name, GENERATOR
    );

    let guard = guard_name(input);
    let _ = writeln!(em.out, "    IFND    {}", guard);
    let _ = writeln!(em.out, "{} SET 1\n", guard);
    let _ = writeln!(em.out, "    NOLIST");
    let _ = writeln!(em.out, "    INCLUDE \"exec/types.i\"");
    let _ = writeln!(em.out, "    LIST\n");

    let nodes = collect_primary_nodes(tu, pre);
    for node in &nodes {
        match node {
            Node::Struct(s) => em.write_struct(s)?,
            Node::Enum(e) => em.write_enum(e),
            Node::Define(d) => em.write_define(d)?,
        }
    }

    if opts.gen_tests {
        for node in &nodes {
            if let Node::Struct(s) = node {
                em.write_struct_test(s)?;
            }
        }
    }

    let _ = writeln!(em.out, "\n    ENDC    ; {}", guard);
    Ok(em.out)
}

/// Include-guard symbol: parent directory and file stem, uppercased.
fn guard_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = input
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_{}_i", parent, stem).to_uppercase()
}

enum Node<'a> {
    Struct(&'a RecordDef),
    Enum(&'a EnumDef),
    Define(&'a MacroDef),
}

impl Node<'_> {
    fn pos(&self) -> usize {
        match self {
            Node::Struct(s) => s.span.start,
            Node::Enum(e) => e.span.start,
            Node::Define(d) => d.out_pos,
        }
    }
}

// Declarations pulled in from included files are skipped; emission order is
// source order within the primary file.
fn collect_primary_nodes<'a>(tu: &'a TranslationUnit, pre: &'a Expanded) -> Vec<Node<'a>> {
    let mut nodes: Vec<Node<'a>> = Vec::new();
    // Defines first: a directive emits no text, so its position coincides with
    // whatever follows it, and the stable sort must keep it in front.
    for d in &pre.macros {
        if d.file == Expanded::PRIMARY {
            nodes.push(Node::Define(d));
        }
    }
    for r in &tu.records {
        if r.kind == RecordKind::Struct && pre.file_of(r.span.start) == Expanded::PRIMARY {
            nodes.push(Node::Struct(r));
        }
    }
    for e in &tu.enums {
        if pre.file_of(e.span.start) == Expanded::PRIMARY {
            nodes.push(Node::Enum(e));
        }
    }
    nodes.sort_by_key(|n| n.pos());
    nodes
}

struct Emitter<'a> {
    lay: &'a Layouts,
    out: String,
}

impl Emitter<'_> {
    // Leading comment block, verbatim, one line per source line.
    fn write_comment_block(&mut self, raw: &str) {
        let mut lines = raw.lines();
        if let Some(first) = lines.next() {
            let _ = write!(self.out, "\n;{}", first);
            for line in lines {
                let _ = write!(self.out, "\n; {}", line);
            }
            self.out.push('\n');
        }
    }

    fn write_struct(&mut self, s: &RecordDef) -> Result<()> {
        if let Some(raw) = &s.raw_comment {
            self.write_comment_block(raw);
        }

        let _ = writeln!(self.out, "    {:<11} {},0", "STRUCTURE", s.tag);

        let total = self
            .lay
            .structs
            .get(&s.tag)
            .ok_or_else(|| anyhow!("no layout for struct {}", s.tag))?
            .size;

        // Walk members against the running byte cursor; the only gap the
        // word-packed model can produce is a single byte of padding.
        let mut offset = 0usize;
        for m in &s.members {
            let reported = self.lay.offset_of(&s.tag, &m.name)?;
            if offset != reported {
                if reported != offset + 1 {
                    bail!(
                        "struct {}: member {} at offset {} but cursor is {}; \
                         only one-byte word-alignment gaps are representable",
                        s.tag,
                        m.name,
                        reported,
                        offset
                    );
                }
                let _ = writeln!(self.out, "        ALIGNWORD");
                offset = (offset + 1) & !1usize;
            }
            self.write_field(m)?;
            offset += self.lay.sizeof_type(&m.ty)?;
        }

        let _ = writeln!(
            self.out,
            "    {:<11} {:<22} ; {} bytes\n",
            "LABEL",
            format!("{}_sizeof", s.tag),
            total
        );
        Ok(())
    }

    fn write_field(&mut self, m: &Member) -> Result<()> {
        let (type_name, var_name) = match &m.ty {
            // STRUCT {name},{numElem}*{elemSize}
            Type::Array(elem, n) => (
                "STRUCT",
                format!("{},{}*{}", m.name, n, self.lay.sizeof_type(elem)?),
            ),
            ty => match self.lay.resolve_member(ty)? {
                // STRUCT {name},{typeSize}
                Resolved::Record { size } | Resolved::Array { size, .. } => {
                    ("STRUCT", format!("{},{}", m.name, size))
                }
                // {type} {name}
                Resolved::Scalar(concrete) => (map_type(&concrete)?, m.name.clone()),
            },
        };

        match &m.comment {
            None => {
                let _ = writeln!(self.out, "        {:<7} {}", type_name, var_name);
            }
            Some(c) => {
                let _ = writeln!(
                    self.out,
                    "        {:<7} {:<22} ; {}",
                    type_name,
                    var_name,
                    truncate_comment(c)
                );
            }
        }
        Ok(())
    }

    fn write_enum(&mut self, e: &EnumDef) {
        match &e.raw_comment {
            Some(raw) => self.write_comment_block(raw),
            None => {
                let _ = writeln!(self.out, "    ; enum {}", e.tag);
            }
        }

        let mut expected: Option<i64> = None;
        for ((name, value), item) in enum_values(e).iter().zip(&e.enumerators) {
            if expected != Some(*value) {
                if *value == 0 {
                    let _ = writeln!(self.out, "    ENUM");
                } else {
                    let _ = writeln!(self.out, "    {:<7} {}", "ENUM", value);
                }
            }
            expected = Some(value.saturating_add(1));

            match &item.comment {
                None => {
                    let _ = writeln!(self.out, "    {:<7} {}", "EITEM", name);
                }
                Some(c) => {
                    let _ = writeln!(
                        self.out,
                        "    {:<7} {:<22} ; {}",
                        "EITEM",
                        name,
                        truncate_comment(c)
                    );
                }
            }
        }

        let _ = writeln!(self.out, "    ; end of enum {}\n", e.tag);
    }

    fn write_define(&mut self, d: &MacroDef) -> Result<()> {
        // Parameterized bodies are not constants; an empty body has no value.
        if d.params.is_some() || d.body.is_empty() {
            return Ok(());
        }
        let mut value = String::new();
        for t in &d.body {
            if t.space_before && !value.is_empty() {
                value.push(' ');
            }
            match t.kind {
                MacroTokKind::Int => value.push_str(&render_int(&t.text)?),
                _ => value.push_str(&t.text),
            }
        }
        let _ = writeln!(self.out, "{:<24} EQU {}", d.name, value);
        Ok(())
    }

    // Build-time re-validation of every member offset and the total size.
    fn write_struct_test(&mut self, s: &RecordDef) -> Result<()> {
        for m in &s.members {
            let off = self.lay.offset_of(&s.tag, &m.name)?;
            self.write_test_block(&m.name, off);
        }
        let total = self
            .lay
            .structs
            .get(&s.tag)
            .ok_or_else(|| anyhow!("no layout for struct {}", s.tag))?
            .size;
        self.write_test_block(&format!("{}_sizeof", s.tag), total);
        Ok(())
    }

    fn write_test_block(&mut self, label: &str, value: usize) {
        let _ = write!(
            self.out,
            "\n    IF      {label}!={value}\n    PRINTV  {label}\n    PRINTV  {value}\n    FAIL    {label} mismatch\n    ENDC\n",
            label = label,
            value = value
        );
    }
}

/// Map a concrete type to its assembler tag. Anything outside the fixed
/// vocabulary is a fatal configuration error.
fn map_type(ty: &Type) -> Result<&'static str> {
    let tag = match ty {
        Type::Pointer(_) => "APTR",
        Type::Char | Type::SChar => "BYTE",
        Type::UChar => "UBYTE",
        Type::Short => "WORD",
        Type::UShort => "UWORD",
        Type::Int | Type::Long => "LONG",
        Type::UInt | Type::ULong => "ULONG",
        Type::Float => "FLOAT",
        Type::Double => "DOUBLE",
        Type::Struct(_) | Type::Union(_) | Type::Array(..) => "STRUCT",
        other => bail!("{} ({}) is not known", kind_label(other), c_spelling(other)),
    };
    Ok(tag)
}

fn kind_label(ty: &Type) -> &'static str {
    match ty {
        Type::Void => "Void",
        Type::Func { .. } => "FunctionProto",
        Type::Named(_) => "Typedef",
        Type::Enum(_) => "Enum",
        _ => "Type",
    }
}

fn c_spelling(ty: &Type) -> String {
    match ty {
        Type::Char => "char".to_string(),
        Type::SChar => "signed char".to_string(),
        Type::UChar => "unsigned char".to_string(),
        Type::Short => "short".to_string(),
        Type::UShort => "unsigned short".to_string(),
        Type::Int => "int".to_string(),
        Type::UInt => "unsigned int".to_string(),
        Type::Long => "long".to_string(),
        Type::ULong => "unsigned long".to_string(),
        Type::Float => "float".to_string(),
        Type::Double => "double".to_string(),
        Type::Void => "void".to_string(),
        Type::Pointer(inner) => format!("{}*", c_spelling(inner)),
        Type::Array(elem, n) => format!("{}[{}]", c_spelling(elem), n),
        Type::Struct(t) => format!("struct {}", t),
        Type::Union(t) => format!("union {}", t),
        Type::Enum(t) => format!("enum {}", t),
        Type::Named(n) => n.clone(),
        Type::Func { .. } => "function".to_string(),
    }
}

/// Comments are clipped to 36 characters on a char boundary.
fn truncate_comment(c: &str) -> &str {
    match c.char_indices().nth(36) {
        Some((i, _)) => &c[..i],
        None => c,
    }
}

/// Strip u/l/z suffixes, parse by radix prefix, then render small values as
/// decimal and everything else in assembler hex syntax.
fn render_int(text: &str) -> Result<String> {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, 'u' | 'U' | 'l' | 'L' | 'z' | 'Z'))
        .collect();
    let v = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse::<u64>()
    }
    .with_context(|| format!("invalid integer literal in macro body: {}", text))?;
    if v < 32 {
        Ok(v.to_string())
    } else {
        Ok(format!("${:x}", v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_int_magnitude_split() {
        assert_eq!(render_int("31").unwrap(), "31");
        assert_eq!(render_int("32").unwrap(), "$20");
        assert_eq!(render_int("0x33").unwrap(), "$33");
        assert_eq!(render_int("0x1f").unwrap(), "31");
        assert_eq!(render_int("40u").unwrap(), "$28");
        assert_eq!(render_int("0xffffffffUL").unwrap(), "$ffffffff");
        assert_eq!(render_int("0755").unwrap(), "$1ed");
        assert_eq!(render_int("0").unwrap(), "0");
    }

    #[test]
    fn truncate_comment_clips_at_36() {
        let long = "a".repeat(50);
        assert_eq!(truncate_comment(&long).len(), 36);
        let exact = "b".repeat(36);
        assert_eq!(truncate_comment(&exact), exact);
        assert_eq!(truncate_comment("short"), "short");
    }

    #[test]
    fn map_type_rejects_void() {
        let err = map_type(&Type::Void).unwrap_err().to_string();
        assert!(err.contains("Void"));
        assert!(err.contains("void"));
        assert!(err.contains("is not known"));
    }

    #[test]
    fn guard_name_from_parent_and_stem() {
        assert_eq!(
            guard_name(Path::new("/src/exec/types.h")),
            "EXEC_TYPES_I"
        );
        assert_eq!(guard_name(Path::new("demo.h")), "_DEMO_I");
    }
}
