use crate::keywords::to_keyword;
use crate::token::{CommentKind, IntBase, LiteralKind, Punctuator as P, Span, Token, TokenKind as K};

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    len: usize,
    pos: usize,
    keep_comments: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            len: src.len(),
            pos: 0,
            keep_comments: false,
        }
    }

    /// Comments are returned as tokens instead of being skipped.
    pub fn with_comments(src: &'a str) -> Self {
        Self {
            keep_comments: true,
            ..Self::new(src)
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }
    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }
    fn starts_with(&self, s: &str) -> bool {
        self.bytes
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(s.as_bytes()))
    }
    fn make_span(&self, start: usize) -> Span {
        Span {
            start,
            end: self.pos,
        }
    }
    fn token(&self, kind: K, start: usize) -> Token {
        Token {
            kind,
            span: self.make_span(start),
        }
    }

    fn is_ident_start(c: u8) -> bool {
        (c == b'_') || (c as char).is_ascii_alphabetic()
    }
    fn is_ident_continue(c: u8) -> bool {
        (c == b'_') || (c as char).is_ascii_alphanumeric()
    }
    fn is_int_suffix(c: u8) -> bool {
        matches!(c, b'u' | b'U' | b'l' | b'L' | b'z' | b'Z')
    }

    fn skip_ws(&mut self) {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n' | 0x0C)) {
                self.pos += 1;
            }
            // line splice \\
            if self.starts_with("\\\n") {
                self.pos += 2;
                continue;
            }
            break;
        }
    }

    // Lex a comment at the current position, or None if there is none.
    fn lex_comment(&mut self) -> Option<Token> {
        let start = self.pos;
        if self.starts_with("//") {
            self.pos += 2;
            while let Some(c) = self.peek() {
                if c == b'\n' {
                    break;
                }
                self.pos += 1;
            }
            let text = self.src[start..self.pos].to_string();
            return Some(self.token(
                K::Comment {
                    kind: CommentKind::Line,
                    text,
                },
                start,
            ));
        }
        if self.starts_with("/*") {
            self.pos += 2;
            while self.pos < self.len && !self.starts_with("*/") {
                self.pos += 1;
            }
            if self.starts_with("*/") {
                self.pos += 2;
            }
            let text = self.src[start..self.pos].to_string();
            return Some(self.token(
                K::Comment {
                    kind: CommentKind::Block,
                    text,
                },
                start,
            ));
        }
        None
    }

    fn lex_number(&mut self, start: usize) -> Token {
        let base = if self.starts_with("0x") || self.starts_with("0X") {
            self.pos += 2;
            while let Some(ch) = self.peek() {
                if (ch as char).is_ascii_hexdigit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            IntBase::Hex
        } else {
            let first = self.peek();
            self.pos += 1;
            while let Some(ch) = self.peek() {
                if (ch as char).is_ascii_digit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            // A fractional part or exponent makes this a floating literal.
            let has_frac = self.peek() == Some(b'.')
                && self.peek_at(1).is_some_and(|c| (c as char).is_ascii_digit());
            let has_exp = matches!(self.peek(), Some(b'e' | b'E'))
                && match self.peek_at(1) {
                    Some(b'+') | Some(b'-') => {
                        self.peek_at(2).is_some_and(|c| (c as char).is_ascii_digit())
                    }
                    Some(c) => (c as char).is_ascii_digit(),
                    None => false,
                };
            if has_frac || has_exp {
                if has_frac {
                    self.pos += 1; // '.'
                    while let Some(ch) = self.peek() {
                        if (ch as char).is_ascii_digit() {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
                if matches!(self.peek(), Some(b'e' | b'E')) {
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                    while let Some(ch) = self.peek() {
                        if (ch as char).is_ascii_digit() {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                }
                if matches!(self.peek(), Some(b'f' | b'F' | b'l' | b'L')) {
                    self.pos += 1;
                }
                let repr = self.src[start..self.pos].to_string();
                return self.token(K::Literal(LiteralKind::Float { repr }), start);
            }
            if first == Some(b'0') && self.pos - start > 1 {
                IntBase::Oct
            } else {
                IntBase::Dec
            }
        };
        // integer suffixes stay in the repr
        while let Some(ch) = self.peek() {
            if Self::is_int_suffix(ch) {
                self.pos += 1;
            } else {
                break;
            }
        }
        let repr = self.src[start..self.pos].to_string();
        self.token(K::Literal(LiteralKind::Int { base, repr }), start)
    }

    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            self.skip_ws();
            if let Some(tok) = self.lex_comment() {
                if self.keep_comments {
                    return Some(tok);
                }
                continue;
            }
            break;
        }
        let start = self.pos;
        let c = self.peek()?;

        // Identifier or keyword
        if Self::is_ident_start(c) {
            self.bump();
            while let Some(c2) = self.peek() {
                if Self::is_ident_continue(c2) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let lex = &self.src[start..self.pos];
            let kind = if let Some(kw) = to_keyword(lex) {
                K::Keyword(kw)
            } else {
                K::Identifier(lex.to_string())
            };
            return Some(self.token(kind, start));
        }

        // Number literal
        if (c as char).is_ascii_digit() {
            return Some(self.lex_number(start));
        }

        // String literal
        if c == b'"' {
            self.bump();
            while let Some(ch) = self.bump() {
                match ch {
                    b'\\' => {
                        let _ = self.bump();
                    }
                    b'"' => break,
                    _ => {}
                }
            }
            let repr = self.src[start..self.pos].to_string();
            return Some(self.token(K::Literal(LiteralKind::String { repr }), start));
        }

        // Char literal
        if c == b'\'' {
            self.bump();
            if let Some(ch) = self.bump() {
                if ch == b'\\' {
                    let _ = self.bump();
                }
            }
            let _ = self.bump(); // closing '
            let repr = self.src[start..self.pos].to_string();
            return Some(self.token(K::Literal(LiteralKind::Char { repr }), start));
        }

        // Punctuators/operators (prefer longest match)
        const MULTI: &[(&str, P)] = &[
            ("...", P::Ellipsis),
            ("->", P::Arrow),
            ("++", P::Inc),
            ("--", P::Dec),
            ("<<", P::Shl),
            (">>", P::Shr),
            ("<=", P::Le),
            (">=", P::Ge),
            ("==", P::Eq),
            ("!=", P::Ne),
            ("&&", P::AndAnd),
            ("||", P::OrOr),
        ];
        for (text, p) in MULTI {
            if self.starts_with(text) {
                self.pos += text.len();
                return Some(self.token(K::Punct(p.clone()), start));
            }
        }

        let ch = self.bump()?;
        let pk = match ch {
            b'(' => P::LParen,
            b')' => P::RParen,
            b'{' => P::LBrace,
            b'}' => P::RBrace,
            b'[' => P::LBracket,
            b']' => P::RBracket,
            b';' => P::Semicolon,
            b',' => P::Comma,
            b'.' => P::Dot,
            b'+' => P::Plus,
            b'-' => P::Minus,
            b'*' => P::Star,
            b'/' => P::Slash,
            b'%' => P::Percent,
            b'&' => P::Amp,
            b'|' => P::Pipe,
            b'^' => P::Caret,
            b'~' => P::Tilde,
            b'!' => P::Bang,
            b'?' => P::Question,
            b':' => P::Colon,
            b'=' => P::Assign,
            b'<' => P::Lt,
            b'>' => P::Gt,
            b'#' => P::Hash,
            _ => {
                return Some(self.token(K::Identifier((ch as char).to_string()), start));
            }
        };
        Some(self.token(K::Punct(pk), start))
    }
}
