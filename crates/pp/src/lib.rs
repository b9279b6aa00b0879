use anyhow::{anyhow, bail, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
enum TokKind {
    Ident,
    Number,
    Str,
    CharLit,
    Comment,
    Whitespace,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Tok {
    kind: TokKind,
    text: String,
}

#[derive(Clone, Debug)]
enum Macro {
    Object(Vec<Tok>),
    Function { params: Vec<String>, body: Vec<Tok> },
}

/// Index into [`Expanded::files`]; the primary input file is always 0.
pub type FileId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroTokKind {
    Ident,
    Int,
    Float,
    Str,
    Char,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroTok {
    pub kind: MacroTokKind,
    pub text: String,
    /// Whitespace separated this token from the previous one in the source.
    pub space_before: bool,
}

/// One `#define`, with its raw (unexpanded) body tokens.
#[derive(Debug, Clone)]
pub struct MacroDef {
    pub name: String,
    /// `Some` for function-like macros.
    pub params: Option<Vec<String>>,
    pub body: Vec<MacroTok>,
    pub file: FileId,
    /// Position in the expanded text where the directive appeared.
    pub out_pos: usize,
}

/// Result of preprocessing: expanded text (comments preserved), the files that
/// contributed to it, every macro definition seen, and a byte-range → file map.
#[derive(Debug, Default)]
pub struct Expanded {
    pub text: String,
    pub files: Vec<PathBuf>,
    pub macros: Vec<MacroDef>,
    map: Vec<(usize, usize, FileId)>,
}

impl Expanded {
    pub const PRIMARY: FileId = 0;

    pub fn file_of(&self, pos: usize) -> FileId {
        for (start, end, id) in &self.map {
            if pos >= *start && pos < *end {
                return *id;
            }
        }
        Self::PRIMARY
    }

    pub fn path(&self, id: FileId) -> &Path {
        &self.files[id]
    }

    fn push_text(&mut self, fid: FileId, s: &str) {
        let start = self.text.len();
        self.text.push_str(s);
        let end = self.text.len();
        if start == end {
            return;
        }
        match self.map.last_mut() {
            Some((_, e, id)) if *id == fid && *e == start => *e = end,
            _ => self.map.push((start, end, fid)),
        }
    }
}

pub struct Preprocessor {
    macros: HashMap<String, Macro>,
    max_depth: usize,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    active: bool,
    seen_true: bool,
    parent_active: bool,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            macros: HashMap::new(),
            max_depth: 128,
        }
    }

    // Command-line definitions (-D NAME[=VALUE]); object-like only.
    pub fn define_object(&mut self, name: &str, body: &str) {
        let (toks, _) = tokenize(body, false);
        self.macros.insert(name.to_string(), Macro::Object(toks));
    }

    pub fn undef(&mut self, name: &str) {
        let _ = self.macros.remove(name);
    }

    /// Expand `path` (and everything it includes) into a single text stream.
    pub fn expand_file(&mut self, path: &Path, include_dirs: &[PathBuf]) -> Result<Expanded> {
        let mut out = Expanded::default();
        let mut stack: Vec<PathBuf> = Vec::new();
        self.process_file(path, include_dirs, &mut out, &mut stack)?;
        Ok(out)
    }

    fn process_file(
        &mut self,
        path: &Path,
        include_dirs: &[PathBuf],
        out: &mut Expanded,
        include_stack: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if include_stack.iter().any(|p| p == &abs) {
            return Err(anyhow!(
                "include cycle detected involving {}",
                path.display()
            ));
        }
        include_stack.push(abs);
        let src = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {}", path.display(), e))?;
        out.files.push(path.to_path_buf());
        let fid = out.files.len() - 1;
        let cur_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let spliced = splice_lines(&src);
        let mut cond_stack: Vec<Frame> = Vec::new();
        let mut in_block_comment = false;

        for raw_line in spliced.lines() {
            let mut line = raw_line;
            if in_block_comment {
                // Continuation of a block comment; keep the text for the parser.
                match line.find("*/") {
                    Some(idx) => {
                        out.push_text(fid, &line[..idx + 2]);
                        in_block_comment = false;
                        line = &line[idx + 2..];
                        if line.trim().is_empty() {
                            out.push_text(fid, "\n");
                            continue;
                        }
                    }
                    None => {
                        out.push_text(fid, line);
                        out.push_text(fid, "\n");
                        continue;
                    }
                }
            }

            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                let rest_trim = trimmed[1..].trim_start();
                let cur_active = cond_stack.last().map(|f| f.active).unwrap_or(true);

                if let Some(drest) = rest_trim.strip_prefix("define") {
                    if cur_active {
                        if let Some((name, params, body)) = parse_define(drest) {
                            out.macros.push(MacroDef {
                                name: name.clone(),
                                params: params.clone(),
                                body: to_macro_toks(&body),
                                file: fid,
                                out_pos: out.text.len(),
                            });
                            let mac = match params {
                                Some(params) => Macro::Function { params, body },
                                None => Macro::Object(body),
                            };
                            self.macros.insert(name, mac);
                        }
                    }
                    continue;
                } else if let Some(urest) = rest_trim.strip_prefix("undef") {
                    if cur_active {
                        if let Some(name) = parse_ident(urest) {
                            let _ = self.macros.remove(&name);
                        }
                    }
                    continue;
                } else if let Some(irest) = rest_trim.strip_prefix("ifdef") {
                    let name = parse_ident(irest);
                    let cond = name.map(|n| self.macros.contains_key(&n)).unwrap_or(false);
                    let act = cur_active && cond;
                    cond_stack.push(Frame {
                        active: act,
                        seen_true: act,
                        parent_active: cur_active,
                    });
                    continue;
                } else if let Some(irest) = rest_trim.strip_prefix("ifndef") {
                    let name = parse_ident(irest);
                    let cond = name.map(|n| !self.macros.contains_key(&n)).unwrap_or(false);
                    let act = cur_active && cond;
                    cond_stack.push(Frame {
                        active: act,
                        seen_true: act,
                        parent_active: cur_active,
                    });
                    continue;
                } else if let Some(erest) = rest_trim.strip_prefix("elif") {
                    let cond = eval_pp_expr(erest, &self.macros);
                    if let Some(top) = cond_stack.last_mut() {
                        if !top.parent_active || top.seen_true {
                            top.active = false;
                        } else {
                            top.active = cond;
                            if cond {
                                top.seen_true = true;
                            }
                        }
                    }
                    continue;
                } else if let Some(irest) = rest_trim.strip_prefix("if") {
                    let cond = eval_pp_expr(irest, &self.macros);
                    let act = cur_active && cond;
                    cond_stack.push(Frame {
                        active: act,
                        seen_true: act,
                        parent_active: cur_active,
                    });
                    continue;
                } else if rest_trim.starts_with("else") {
                    if let Some(top) = cond_stack.last_mut() {
                        if !top.parent_active {
                            top.active = false;
                        } else {
                            top.active = !top.seen_true;
                            if top.active {
                                top.seen_true = true;
                            }
                        }
                    }
                    continue;
                } else if rest_trim.starts_with("endif") {
                    let _ = cond_stack.pop();
                    continue;
                } else if let Some(irest) = rest_trim.strip_prefix("include") {
                    if cur_active {
                        let name = parse_include_name(irest)
                            .ok_or_else(|| anyhow!("malformed #include: {}", raw_line.trim()))?;
                        let fp = resolve_include(&name, &cur_dir, include_dirs)
                            .ok_or_else(|| anyhow!("include not found: {}", name.0))?;
                        self.process_file(&fp, include_dirs, out, include_stack)?;
                    }
                    continue;
                } else if let Some(erest) = rest_trim.strip_prefix("error") {
                    if cur_active {
                        bail!("#error: {}", erest.trim());
                    }
                    continue;
                } else {
                    // Unknown directive (#pragma etc.): ignore
                    continue;
                }
            }

            let cur_active = cond_stack.last().map(|f| f.active).unwrap_or(true);
            if cur_active {
                let (toks, open_comment) = tokenize(line, true);
                in_block_comment = open_comment;
                let mut active_macros = HashSet::new();
                let expanded =
                    expand_tokens(&self.macros, &toks, &mut active_macros, 0, self.max_depth);
                out.push_text(fid, &untokenize(&expanded));
                out.push_text(fid, "\n");
            }
        }

        let _ = include_stack.pop();
        Ok(())
    }
}

fn splice_lines(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some('\n') = chars.peek().copied() {
                let _ = chars.next();
                continue;
            }
        }
        out.push(ch);
    }
    out
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}
fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

/// Tokenize one line. Returns the tokens and whether the line ends inside an
/// unterminated block comment. With `comments` false, `//` and `/*` are plain
/// punctuation (used for macro bodies given on the command line).
fn tokenize(s: &str, comments: bool) -> (Vec<Tok>, bool) {
    let mut toks = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0usize;
    let mut open_comment = false;
    while i < bytes.len() {
        let ch = bytes[i] as char;
        if ch.is_whitespace() {
            let start = i;
            while i < bytes.len() && (bytes[i] as char).is_whitespace() {
                i += 1;
            }
            toks.push(Tok {
                kind: TokKind::Whitespace,
                text: s[start..i].to_string(),
            });
            continue;
        }
        if comments && s[i..].starts_with("//") {
            toks.push(Tok {
                kind: TokKind::Comment,
                text: s[i..].to_string(),
            });
            break;
        }
        if comments && s[i..].starts_with("/*") {
            let start = i;
            match s[i + 2..].find("*/") {
                Some(idx) => {
                    i = i + 2 + idx + 2;
                    toks.push(Tok {
                        kind: TokKind::Comment,
                        text: s[start..i].to_string(),
                    });
                    continue;
                }
                None => {
                    toks.push(Tok {
                        kind: TokKind::Comment,
                        text: s[start..].to_string(),
                    });
                    open_comment = true;
                    break;
                }
            }
        }
        if is_ident_start(ch) {
            let start = i;
            while i < bytes.len() && is_ident_continue(bytes[i] as char) {
                i += 1;
            }
            toks.push(Tok {
                kind: TokKind::Ident,
                text: s[start..i].to_string(),
            });
            continue;
        }
        if ch.is_ascii_digit() {
            // pp-number: digits plus identifier chars and '.' (covers 0x, suffixes, floats)
            let start = i;
            while i < bytes.len() && (is_ident_continue(bytes[i] as char) || bytes[i] == b'.') {
                i += 1;
            }
            toks.push(Tok {
                kind: TokKind::Number,
                text: s[start..i].to_string(),
            });
            continue;
        }
        if ch == '"' || ch == '\'' {
            let quote = bytes[i];
            let start = i;
            i += 1;
            while i < bytes.len() {
                if bytes[i] == b'\\' {
                    i += 2;
                    continue;
                }
                if bytes[i] == quote {
                    i += 1;
                    break;
                }
                i += 1;
            }
            let i = i.min(bytes.len());
            toks.push(Tok {
                kind: if quote == b'"' {
                    TokKind::Str
                } else {
                    TokKind::CharLit
                },
                text: s[start..i.min(s.len())].to_string(),
            });
            continue;
        }
        // Non-ASCII bytes can only reach this arm; re-read as a proper char.
        let ch = s[i..].chars().next().unwrap();
        toks.push(Tok {
            kind: TokKind::Other,
            text: ch.to_string(),
        });
        i += ch.len_utf8();
    }
    (toks, open_comment)
}

fn untokenize(toks: &[Tok]) -> String {
    let mut s = String::new();
    for t in toks {
        s.push_str(&t.text);
    }
    s
}

fn classify_number(text: &str) -> MacroTokKind {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, 'u' | 'U' | 'l' | 'L' | 'z' | 'Z'))
        .collect();
    let digits = stripped
        .strip_prefix("0x")
        .or_else(|| stripped.strip_prefix("0X"));
    let is_int = match digits {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()),
    };
    if is_int {
        MacroTokKind::Int
    } else {
        MacroTokKind::Float
    }
}

fn to_macro_toks(body: &[Tok]) -> Vec<MacroTok> {
    let mut out = Vec::new();
    let mut space = false;
    for t in body {
        match t.kind {
            TokKind::Whitespace | TokKind::Comment => {
                space = true;
                continue;
            }
            _ => {}
        }
        let kind = match t.kind {
            TokKind::Ident => MacroTokKind::Ident,
            TokKind::Number => classify_number(&t.text),
            TokKind::Str => MacroTokKind::Str,
            TokKind::CharLit => MacroTokKind::Char,
            _ => MacroTokKind::Punct,
        };
        out.push(MacroTok {
            kind,
            text: t.text.clone(),
            space_before: space,
        });
        space = false;
    }
    out
}

fn parse_ident(s: &str) -> Option<String> {
    let s = s.trim_start();
    let mut buf = String::new();
    for (i, c) in s.char_indices() {
        if i == 0 {
            if !is_ident_start(c) {
                return None;
            }
            buf.push(c);
        } else if is_ident_continue(c) {
            buf.push(c);
        } else {
            break;
        }
    }
    if buf.is_empty() {
        None
    } else {
        Some(buf)
    }
}

// Parse the text after "#define": name, optional parameter list (only when the
// '(' immediately follows the name), body tokens.
#[allow(clippy::type_complexity)]
fn parse_define(s: &str) -> Option<(String, Option<Vec<String>>, Vec<Tok>)> {
    let s = s.trim_start();
    let name = parse_ident(s)?;
    let rest = &s[name.len()..];
    if let Some(prest) = rest.strip_prefix('(') {
        let close = prest.find(')')?;
        let params: Vec<String> = prest[..close]
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let (body, _) = tokenize(prest[close + 1..].trim_start(), true);
        return Some((name, Some(params), body));
    }
    let (body, _) = tokenize(rest.trim_start(), true);
    Some((name, None, body))
}

struct IncludeName(String, bool); // name, angled

fn parse_include_name(s: &str) -> Option<IncludeName> {
    let s = s.trim_start();
    let mut cs = s.chars();
    let first = cs.next()?;
    let endch = match first {
        '"' => '"',
        '<' => '>',
        _ => return None,
    };
    let mut name = String::new();
    for ch in cs {
        if ch == endch {
            return Some(IncludeName(name, endch == '>'));
        }
        name.push(ch);
    }
    None
}

fn resolve_include(name: &IncludeName, cur_dir: &Path, include_dirs: &[PathBuf]) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if !name.1 {
        candidates.push(cur_dir.join(&name.0));
    }
    for d in include_dirs {
        candidates.push(d.join(&name.0));
    }
    candidates.into_iter().find(|c| c.exists())
}

fn next_non_ws(toks: &[Tok], mut i: usize) -> Option<usize> {
    while i < toks.len() {
        if !matches!(toks[i].kind, TokKind::Whitespace | TokKind::Comment) {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn parse_macro_args(toks: &[Tok], mut i: usize) -> Option<(Vec<Vec<Tok>>, usize)> {
    // Called with i positioned at the token after '(' of a macro call.
    let mut args: Vec<Vec<Tok>> = Vec::new();
    let mut current: Vec<Tok> = Vec::new();
    let mut depth: usize = 0;
    while i < toks.len() {
        let t = &toks[i];
        if let TokKind::Other = t.kind {
            if t.text == "(" {
                depth += 1;
            } else if t.text == ")" {
                if depth == 0 {
                    args.push(current);
                    return Some((args, i + 1));
                }
                depth -= 1;
            } else if t.text == "," && depth == 0 {
                args.push(std::mem::take(&mut current));
                i += 1;
                continue;
            }
        }
        current.push(t.clone());
        i += 1;
    }
    None
}

fn substitute(body: &[Tok], params: &[String], args: &[Vec<Tok>]) -> Vec<Tok> {
    let mut pmap: HashMap<&str, usize> = HashMap::new();
    for (i, p) in params.iter().enumerate() {
        pmap.insert(p.as_str(), i);
    }
    let mut out: Vec<Tok> = Vec::new();
    for t in body {
        if t.kind == TokKind::Ident {
            if let Some(&idx) = pmap.get(t.text.as_str()) {
                out.extend(args[idx].iter().cloned());
                continue;
            }
        }
        out.push(t.clone());
    }
    out
}

fn expand_tokens(
    macros: &HashMap<String, Macro>,
    toks: &[Tok],
    active: &mut HashSet<String>,
    depth: usize,
    max_depth: usize,
) -> Vec<Tok> {
    if depth >= max_depth {
        return toks.to_vec();
    }
    let mut out: Vec<Tok> = Vec::new();
    let mut i: usize = 0;
    while i < toks.len() {
        let t = &toks[i];
        if t.kind != TokKind::Ident || active.contains(&t.text) {
            out.push(t.clone());
            i += 1;
            continue;
        }
        match macros.get(&t.text) {
            Some(Macro::Object(body)) => {
                active.insert(t.text.clone());
                let expanded = expand_tokens(macros, body, active, depth + 1, max_depth);
                active.remove(&t.text);
                out.extend(expanded);
                i += 1;
            }
            Some(Macro::Function { params, body }) => {
                let call = next_non_ws(toks, i + 1).filter(|&j| {
                    toks[j].kind == TokKind::Other && toks[j].text == "("
                });
                match call.and_then(|j| parse_macro_args(toks, j + 1)) {
                    Some((args, next_idx)) if args.len() == params.len() => {
                        active.insert(t.text.clone());
                        let args_exp: Vec<Vec<Tok>> = args
                            .iter()
                            .map(|a| expand_tokens(macros, a, active, depth + 1, max_depth))
                            .collect();
                        let substituted = substitute(body, params, &args_exp);
                        let res =
                            expand_tokens(macros, &substituted, active, depth + 1, max_depth);
                        active.remove(&t.text);
                        out.extend(res);
                        i = next_idx;
                    }
                    _ => {
                        out.push(t.clone());
                        i += 1;
                    }
                }
            }
            None => {
                out.push(t.clone());
                i += 1;
            }
        }
    }
    out
}

// -------- Conditional expression evaluator --------

fn parse_number_value(text: &str) -> Option<i64> {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, 'u' | 'U' | 'l' | 'L' | 'z' | 'Z'))
        .collect();
    if let Some(hex) = stripped
        .strip_prefix("0x")
        .or_else(|| stripped.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()
    } else if stripped.len() > 1 && stripped.starts_with('0') {
        i64::from_str_radix(&stripped[1..], 8).ok()
    } else {
        stripped.parse::<i64>().ok()
    }
}

fn macro_int_value(macros: &HashMap<String, Macro>, name: &str) -> Option<i64> {
    if let Some(Macro::Object(body)) = macros.get(name) {
        let body_no_ws: Vec<&Tok> = body
            .iter()
            .filter(|t| !matches!(t.kind, TokKind::Whitespace | TokKind::Comment))
            .collect();
        if body_no_ws.len() == 1 && body_no_ws[0].kind == TokKind::Number {
            if let Some(v) = parse_number_value(&body_no_ws[0].text) {
                return Some(v);
            }
        }
        return Some(0);
    }
    None
}

struct PE<'a> {
    toks: Vec<Tok>,
    i: usize,
    macros: &'a HashMap<String, Macro>,
}

impl<'a> PE<'a> {
    fn new(expr: &str, macros: &'a HashMap<String, Macro>) -> Self {
        let (toks, _) = tokenize(expr, true);
        let toks = toks
            .into_iter()
            .filter(|t| !matches!(t.kind, TokKind::Whitespace | TokKind::Comment))
            .collect();
        Self { toks, i: 0, macros }
    }

    fn eat_other(&mut self, s: &str) -> bool {
        if self
            .toks
            .get(self.i)
            .is_some_and(|t| t.kind == TokKind::Other && t.text == s)
        {
            self.i += 1;
            return true;
        }
        false
    }

    fn eat_pair(&mut self, a: &str, b: &str) -> bool {
        let i0 = self.i;
        if self.eat_other(a) {
            if self.eat_other(b) {
                return true;
            }
            self.i = i0;
        }
        false
    }

    fn parse_primary(&mut self) -> i64 {
        if self.eat_other("(") {
            let v = self.parse_or();
            let _ = self.eat_other(")");
            return v;
        }
        match self.toks.get(self.i).cloned() {
            Some(t) if t.kind == TokKind::Number => {
                self.i += 1;
                parse_number_value(&t.text).unwrap_or(0)
            }
            Some(t) if t.kind == TokKind::Ident && t.text == "defined" => {
                self.i += 1;
                let has_paren = self.eat_other("(");
                let name = match self.toks.get(self.i) {
                    Some(t2) if t2.kind == TokKind::Ident => {
                        let n = t2.text.clone();
                        self.i += 1;
                        n
                    }
                    _ => String::new(),
                };
                if has_paren {
                    let _ = self.eat_other(")");
                }
                i64::from(!name.is_empty() && self.macros.contains_key(&name))
            }
            Some(t) if t.kind == TokKind::Ident => {
                self.i += 1;
                macro_int_value(self.macros, &t.text).unwrap_or(0)
            }
            _ => 0,
        }
    }

    fn parse_unary(&mut self) -> i64 {
        if self.eat_other("!") {
            return i64::from(self.parse_unary() == 0);
        }
        if self.eat_other("-") {
            return -self.parse_unary();
        }
        if self.eat_other("+") {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_cmp(&mut self) -> i64 {
        let lhs = self.parse_unary();
        if self.eat_pair("=", "=") {
            return i64::from(lhs == self.parse_unary());
        }
        if self.eat_pair("!", "=") {
            return i64::from(lhs != self.parse_unary());
        }
        if self.eat_pair("<", "=") {
            return i64::from(lhs <= self.parse_unary());
        }
        if self.eat_pair(">", "=") {
            return i64::from(lhs >= self.parse_unary());
        }
        if self.eat_other("<") {
            return i64::from(lhs < self.parse_unary());
        }
        if self.eat_other(">") {
            return i64::from(lhs > self.parse_unary());
        }
        lhs
    }

    fn parse_and(&mut self) -> i64 {
        let mut v = self.parse_cmp();
        while self.eat_pair("&", "&") {
            let rhs = self.parse_cmp();
            v = i64::from(v != 0 && rhs != 0);
        }
        v
    }

    fn parse_or(&mut self) -> i64 {
        let mut v = self.parse_and();
        while self.eat_pair("|", "|") {
            let rhs = self.parse_and();
            v = i64::from(v != 0 || rhs != 0);
        }
        v
    }
}

fn eval_pp_expr(expr: &str, macros: &HashMap<String, Macro>) -> bool {
    let mut pe = PE::new(expr, macros);
    pe.parse_or() != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_numbers() {
        assert_eq!(classify_number("42"), MacroTokKind::Int);
        assert_eq!(classify_number("0x33"), MacroTokKind::Int);
        assert_eq!(classify_number("1u"), MacroTokKind::Int);
        assert_eq!(classify_number("0xffffffffUL"), MacroTokKind::Int);
        assert_eq!(classify_number("1.5"), MacroTokKind::Float);
        assert_eq!(classify_number("1e6"), MacroTokKind::Float);
    }

    #[test]
    fn eval_defined_and_comparisons() {
        let mut macros = HashMap::new();
        macros.insert(
            "X".to_string(),
            Macro::Object(vec![Tok {
                kind: TokKind::Number,
                text: "3".to_string(),
            }]),
        );
        assert!(eval_pp_expr("defined(X)", &macros));
        assert!(eval_pp_expr("X == 3", &macros));
        assert!(!eval_pp_expr("defined(Y) && X > 1", &macros));
        assert!(eval_pp_expr("!defined(Y) || 0", &macros));
    }
}
