use anyhow::{bail, Context, Result};
use lex::{IntBase, Keyword as Kw, Lexer, LiteralKind, Punctuator as P, Token, TokenKind as K};
use std::collections::HashSet;

use crate::ast::*;

pub struct Parser<'a> {
    src: &'a str,
    toks: Vec<Token>,
    // Comments in source order, kept out of the token stream and attached by
    // position when declarations are built.
    comments: Vec<(Span, String)>,
    pos: usize,
    typedef_names: HashSet<String>,
    records: Vec<RecordDef>,
    enums: Vec<EnumDef>,
    typedefs: Vec<(String, Type)>,
}

impl<'a> Parser<'a> {
    pub fn from_source(src: &'a str) -> Self {
        let mut lx = Lexer::with_comments(src);
        let mut toks = Vec::new();
        let mut comments = Vec::new();
        while let Some(t) = lx.next_token() {
            match t.kind {
                K::Comment { text, .. } => comments.push((t.span, text)),
                _ => toks.push(t),
            }
        }
        Self {
            src,
            toks,
            comments,
            pos: 0,
            typedef_names: HashSet::new(),
            records: Vec::new(),
            enums: Vec::new(),
            typedefs: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos)
    }
    fn bump(&mut self) -> Option<&Token> {
        let i = self.pos;
        self.pos += 1;
        self.toks.get(i)
    }

    fn peek_kind(&self) -> Option<K> {
        self.peek().map(|t| t.kind.clone())
    }

    fn expect_punct(&mut self, p: P) -> Result<()> {
        match self.bump().map(|t| &t.kind) {
            Some(K::Punct(pp)) if *pp == p => Ok(()),
            other => bail!("expected punct {:?}, got {:?}", p, other),
        }
    }

    fn consume_punct(&mut self, p: P) -> bool {
        if let Some(K::Punct(pp)) = self.peek().map(|t| &t.kind) {
            if *pp == p {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn consume_keyword(&mut self, kw: Kw) -> bool {
        if let Some(K::Keyword(k)) = self.peek().map(|t| &t.kind) {
            if *k == kw {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.bump().map(|t| &t.kind) {
            Some(K::Identifier(s)) => Ok(s.clone()),
            other => bail!("expected identifier, got {:?}", other),
        }
    }

    fn is_typedef_name(&self, s: &str) -> bool {
        self.typedef_names.contains(s)
    }

    fn peek_is_type_name(&self) -> bool {
        match self.peek_kind() {
            Some(K::Keyword(kw)) => matches!(
                kw,
                Kw::Int
                    | Kw::Void
                    | Kw::Struct
                    | Kw::Union
                    | Kw::Enum
                    | Kw::Signed
                    | Kw::Unsigned
                    | Kw::Short
                    | Kw::Long
                    | Kw::Char
                    | Kw::Float
                    | Kw::Double
            ),
            Some(K::Identifier(ref s)) => self.is_typedef_name(s),
            _ => false,
        }
    }

    // ===== comment attachment =====

    /// Strip the // or /* */ markers from a trailing comment.
    fn brief_text(raw: &str) -> String {
        let t = raw.trim();
        let t = if let Some(rest) = t.strip_prefix("//") {
            rest
        } else if let Some(rest) = t.strip_prefix("/*") {
            rest.strip_suffix("*/").unwrap_or(rest)
        } else {
            t
        };
        t.trim().to_string()
    }

    fn is_ws(s: &str) -> bool {
        s.chars().all(char::is_whitespace)
    }
    fn newlines(s: &str) -> usize {
        s.bytes().filter(|b| *b == b'\n').count()
    }

    /// Comment block immediately above `decl_start`: a run of own-line
    /// comments with no blank line (and no code) between them and the
    /// declaration. Returns the raw text, one source line per line.
    fn leading_comment_before(&self, decl_start: usize) -> Option<String> {
        let mut idx = self
            .comments
            .iter()
            .take_while(|c| c.0.end <= decl_start)
            .count();
        let mut run: Vec<&str> = Vec::new();
        let mut boundary = decl_start;
        while idx > 0 {
            let (span, text) = &self.comments[idx - 1];
            let gap = &self.src[span.end..boundary];
            if !Self::is_ws(gap) || Self::newlines(gap) > 1 {
                break;
            }
            // Skip trailing comments that share a line with code.
            let line_start = self.src[..span.start]
                .rfind('\n')
                .map(|i| i + 1)
                .unwrap_or(0);
            if !Self::is_ws(&self.src[line_start..span.start]) {
                break;
            }
            run.push(text);
            boundary = span.start;
            idx -= 1;
        }
        if run.is_empty() {
            None
        } else {
            run.reverse();
            Some(run.join("\n"))
        }
    }

    /// Comment on the same line as the last consumed token, if any.
    fn trailing_comment(&self) -> Option<String> {
        let prev_end = self.toks.get(self.pos.checked_sub(1)?)?.span.end;
        let limit = self
            .peek()
            .map(|t| t.span.start)
            .unwrap_or(self.src.len());
        for (span, text) in &self.comments {
            if span.start >= limit {
                break;
            }
            if span.start >= prev_end {
                if self.src[prev_end..span.start].contains('\n') {
                    break;
                }
                return Some(Self::brief_text(text));
            }
        }
        None
    }

    // ===== types and declarators =====

    fn parse_type(&mut self) -> Result<Type> {
        loop {
            if self.consume_keyword(Kw::Const) || self.consume_keyword(Kw::Volatile) {
                continue;
            }
            break;
        }

        // Accept C89 specifier sequences; track signedness and width
        let mut saw_any_spec = false;
        let mut saw_signed = false;
        let mut saw_unsigned = false;
        let mut count_short = 0usize;
        let mut count_long = 0usize;
        let mut saw_char = false;
        let mut saw_float = false;
        let mut saw_double = false;
        loop {
            match self.peek_kind() {
                Some(K::Keyword(kw))
                    if matches!(
                        kw,
                        Kw::Signed
                            | Kw::Unsigned
                            | Kw::Short
                            | Kw::Long
                            | Kw::Char
                            | Kw::Int
                            | Kw::Float
                            | Kw::Double
                    ) =>
                {
                    self.pos += 1;
                    saw_any_spec = true;
                    match kw {
                        Kw::Signed => saw_signed = true,
                        Kw::Unsigned => saw_unsigned = true,
                        Kw::Short => count_short = count_short.saturating_add(1),
                        Kw::Long => count_long = count_long.saturating_add(1),
                        Kw::Char => saw_char = true,
                        Kw::Float => saw_float = true,
                        Kw::Double => saw_double = true,
                        _ => {}
                    }
                }
                _ => break,
            }
        }
        if saw_any_spec {
            if saw_double {
                return Ok(Type::Double);
            }
            if saw_float {
                return Ok(Type::Float);
            }
            if saw_char {
                let ty = if saw_unsigned {
                    Type::UChar
                } else if saw_signed {
                    Type::SChar
                } else {
                    Type::Char
                };
                return Ok(ty);
            }
            if count_short > 0 {
                let ty = if saw_unsigned { Type::UShort } else { Type::Short };
                return Ok(ty);
            }
            if count_long > 0 {
                let ty = if saw_unsigned { Type::ULong } else { Type::Long };
                return Ok(ty);
            }
            let ty = if saw_unsigned { Type::UInt } else { Type::Int };
            return Ok(ty);
        }
        if self.consume_keyword(Kw::Void) {
            return Ok(Type::Void);
        }
        if let Some(tok) = self.peek() {
            let span = tok.span;
            if self.consume_keyword(Kw::Struct) {
                return self.parse_record_tail(RecordKind::Struct, span);
            }
            if self.consume_keyword(Kw::Union) {
                return self.parse_record_tail(RecordKind::Union, span);
            }
            if self.consume_keyword(Kw::Enum) {
                return self.parse_enum_tail(span);
            }
        }
        // typedef-name as a type-specifier
        if let Some(K::Identifier(ref s)) = self.peek_kind() {
            if self.is_typedef_name(s) {
                let name = self.expect_ident()?;
                return Ok(Type::Named(name));
            }
        }

        bail!("expected type specifier, got {:?}", self.peek_kind())
    }

    fn parse_record_tail(&mut self, kind: RecordKind, span: Span) -> Result<Type> {
        let tag = if let Some(K::Identifier(name)) = self.peek_kind() {
            self.pos += 1;
            name
        } else {
            String::new()
        };
        if self.consume_punct(P::LBrace) {
            let members = self.parse_members()?;
            self.records.push(RecordDef {
                kind,
                tag: tag.clone(),
                members,
                raw_comment: None,
                span,
            });
        }
        let ty = match kind {
            RecordKind::Struct => Type::Struct(tag),
            RecordKind::Union => Type::Union(tag),
        };
        Ok(ty)
    }

    fn parse_members(&mut self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = Vec::new();
        loop {
            if self.consume_punct(P::RBrace) {
                break;
            }
            if self.consume_punct(P::Semicolon) {
                continue;
            }
            let base = self.parse_type()?;
            loop {
                let mut mty = base.clone();
                while self.consume_punct(P::Star) {
                    mty = Type::Pointer(Box::new(mty));
                }
                let mname;
                if self.consume_punct(P::LParen) {
                    // function-pointer member: T (*name)(params);
                    self.expect_punct(P::Star)?;
                    mname = self.expect_ident()?;
                    self.expect_punct(P::RParen)?;
                    self.expect_punct(P::LParen)?;
                    let (param_types, variadic) = self.parse_param_types_list()?;
                    mty = Type::Pointer(Box::new(Type::Func {
                        ret: Box::new(mty),
                        params: param_types,
                        variadic,
                    }));
                } else {
                    mname = self.expect_ident()?;
                    mty = self.parse_array_suffix(mty)?;
                }
                if self.consume_punct(P::Colon) {
                    bail!("bit-field member '{}' is not supported", mname);
                }
                members.push(Member {
                    name: mname,
                    ty: mty,
                    comment: None,
                });
                if self.consume_punct(P::Comma) {
                    continue;
                }
                break;
            }
            self.expect_punct(P::Semicolon)?;
            if let Some(c) = self.trailing_comment() {
                if let Some(last) = members.last_mut() {
                    last.comment = Some(c);
                }
            }
        }
        Ok(members)
    }

    fn parse_enum_tail(&mut self, span: Span) -> Result<Type> {
        let tag = if let Some(K::Identifier(name)) = self.peek_kind() {
            self.pos += 1;
            name
        } else {
            String::new()
        };
        if self.consume_punct(P::LBrace) {
            let mut enumerators: Vec<Enumerator> = Vec::new();
            loop {
                if self.consume_punct(P::RBrace) {
                    break;
                }
                let name = match self.peek_kind() {
                    Some(K::Identifier(n)) => {
                        self.pos += 1;
                        n
                    }
                    other => bail!("expected enumerator identifier, got {:?}", other),
                };
                let mut value: Option<i64> = None;
                if self.consume_punct(P::Assign) {
                    let neg = self.consume_punct(P::Minus);
                    match self.peek_kind() {
                        Some(K::Literal(LiteralKind::Int { base, repr })) => {
                            self.pos += 1;
                            let v = int_literal_value(base, &repr)?;
                            value = Some(if neg { -v } else { v });
                        }
                        other => {
                            bail!("expected integer literal for enumerator '{}', got {:?}", name, other)
                        }
                    }
                }
                let _ = self.consume_punct(P::Comma);
                let comment = self.trailing_comment();
                enumerators.push(Enumerator {
                    name,
                    value,
                    comment,
                });
            }
            self.enums.push(EnumDef {
                tag: tag.clone(),
                enumerators,
                raw_comment: None,
                span,
            });
        }
        Ok(Type::Enum(tag))
    }

    fn parse_array_suffix(&mut self, mut ty: Type) -> Result<Type> {
        if self.consume_punct(P::LBracket) {
            let mut sizes: Vec<usize> = Vec::new();
            loop {
                let sz = match self.peek_kind() {
                    Some(K::Literal(LiteralKind::Int { base, repr })) => {
                        self.pos += 1;
                        usize::try_from(int_literal_value(base, &repr)?)
                            .context("negative array size")?
                    }
                    other => bail!("expected integer literal array size, got {:?}", other),
                };
                self.expect_punct(P::RBracket)?;
                sizes.push(sz);
                if !self.consume_punct(P::LBracket) {
                    break;
                }
            }
            // rightmost dimension is the innermost
            for sz in sizes.into_iter().rev() {
                ty = Type::Array(Box::new(ty), sz);
            }
        }
        Ok(ty)
    }

    // Parameter type list for declarators (names allowed and ignored)
    fn parse_param_types_list(&mut self) -> Result<(Vec<Type>, bool)> {
        if self.consume_punct(P::RParen) {
            return Ok((vec![], false));
        }
        if self.consume_keyword(Kw::Void) {
            if self.consume_punct(P::RParen) {
                return Ok((vec![], false));
            }
            bail!("expected ')' after void parameter list");
        }

        let mut params: Vec<Type> = Vec::new();
        let mut variadic = false;
        loop {
            if let Some(K::Punct(P::Ellipsis)) = self.peek_kind() {
                self.pos += 1;
                self.expect_punct(P::RParen)?;
                variadic = true;
                return Ok((params, variadic));
            }
            let mut ty = self.parse_type()?;
            while self.consume_punct(P::Star) {
                ty = Type::Pointer(Box::new(ty));
            }
            if let Some(K::Identifier(_)) = self.peek_kind() {
                let _ = self.expect_ident()?;
                ty = self.parse_array_suffix(ty)?;
            }
            params.push(ty);

            if self.consume_punct(P::Comma) {
                continue;
            }
            self.expect_punct(P::RParen)?;
            break;
        }
        Ok((params, variadic))
    }

    // ===== skipping =====

    // Consume tokens until the ')' matching an already-consumed '('.
    fn skip_balanced_parens(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while let Some(t) = self.bump() {
            match &t.kind {
                K::Punct(P::LParen) => depth += 1,
                K::Punct(P::RParen) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        bail!("unexpected EOF inside parenthesized list")
    }

    // Skip a function body (balanced braces), leading '{' not yet consumed.
    fn skip_balanced_braces(&mut self) -> Result<()> {
        self.expect_punct(P::LBrace)?;
        let mut depth = 1usize;
        while let Some(t) = self.bump() {
            match &t.kind {
                K::Punct(P::LBrace) => depth += 1,
                K::Punct(P::RBrace) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        bail!("unexpected EOF inside function body")
    }

    // Skip an initializer expression up to (not including) the terminating ';'.
    fn skip_initializer(&mut self) -> Result<()> {
        let mut depth = 0usize;
        while let Some(t) = self.peek() {
            match &t.kind {
                K::Punct(P::LParen) | K::Punct(P::LBrace) | K::Punct(P::LBracket) => depth += 1,
                K::Punct(P::RParen) | K::Punct(P::RBrace) | K::Punct(P::RBracket) => {
                    depth = depth.saturating_sub(1)
                }
                K::Punct(P::Semicolon) if depth == 0 => return Ok(()),
                _ => {}
            }
            self.pos += 1;
        }
        bail!("unexpected EOF inside initializer")
    }

    // ===== top level =====

    fn parse_top_level_item(&mut self) -> Result<()> {
        loop {
            if self.consume_keyword(Kw::Extern)
                || self.consume_keyword(Kw::Static)
                || self.consume_keyword(Kw::Const)
                || self.consume_keyword(Kw::Volatile)
                || self.consume_keyword(Kw::Register)
                || self.consume_keyword(Kw::Auto)
            {
                continue;
            }
            break;
        }

        if self.consume_keyword(Kw::Typedef) {
            let mut ty = self.parse_type()?;
            while self.consume_punct(P::Star) {
                ty = Type::Pointer(Box::new(ty));
            }

            // function-pointer typedef: typedef T (*Name)(param-types);
            if self.consume_punct(P::LParen) {
                self.expect_punct(P::Star)?;
                let name = self.expect_ident()?;
                self.expect_punct(P::RParen)?;
                self.expect_punct(P::LParen)?;
                let (param_types, variadic) = self.parse_param_types_list()?;
                let fn_ty = Type::Func {
                    ret: Box::new(ty),
                    params: param_types,
                    variadic,
                };
                let ty = Type::Pointer(Box::new(fn_ty));
                self.expect_punct(P::Semicolon)?;
                self.typedef_names.insert(name.clone());
                self.typedefs.push((name, ty));
                return Ok(());
            }

            let name = self.expect_ident()?;
            let ty = self.parse_array_suffix(ty)?;
            self.expect_punct(P::Semicolon)?;
            self.typedef_names.insert(name.clone());
            self.typedefs.push((name, ty));
            return Ok(());
        }

        if !self.peek_is_type_name() {
            bail!("expected declaration at top level, got {:?}", self.peek_kind());
        }

        let mut ty = self.parse_type()?;
        while self.consume_punct(P::Star) {
            ty = Type::Pointer(Box::new(ty));
        }

        // tag declaration or definition with no declarator: 'struct S;' / 'struct S {...};'
        if matches!(ty, Type::Struct(_) | Type::Union(_) | Type::Enum(_))
            && self.consume_punct(P::Semicolon)
        {
            return Ok(());
        }

        // global function-pointer declarator: T (*name)(params);
        if self.consume_punct(P::LParen) {
            self.expect_punct(P::Star)?;
            let _name = self.expect_ident()?;
            self.expect_punct(P::RParen)?;
            self.expect_punct(P::LParen)?;
            self.skip_balanced_parens()?;
            if self.consume_punct(P::Assign) {
                self.skip_initializer()?;
            }
            self.expect_punct(P::Semicolon)?;
            return Ok(());
        }

        let _name = self.expect_ident()?;

        // function prototype or definition
        if self.consume_punct(P::LParen) {
            self.skip_balanced_parens()?;
            if self.consume_punct(P::Semicolon) {
                return Ok(());
            }
            self.skip_balanced_braces()?;
            return Ok(());
        }

        // global variable: optional array declarator and initializer, both ignored
        let _ = self.parse_array_suffix(ty)?;
        if self.consume_punct(P::Assign) {
            self.skip_initializer()?;
        }
        self.expect_punct(P::Semicolon)?;
        Ok(())
    }

    pub fn parse_translation_unit(&mut self) -> Result<TranslationUnit> {
        while let Some(tok) = self.peek() {
            if matches!(tok.kind, K::Punct(P::Semicolon)) {
                self.pos += 1;
                continue;
            }
            let item_start = tok.span.start;
            let n_records = self.records.len();
            let n_enums = self.enums.len();
            self.parse_top_level_item()?;
            // Attach the adjacent leading comment to the definition this item
            // introduced (the outermost one, pushed last).
            if let Some(raw) = self.leading_comment_before(item_start) {
                if self.records.len() > n_records {
                    let r = self.records.last_mut().unwrap();
                    if r.raw_comment.is_none() {
                        r.raw_comment = Some(raw);
                    }
                } else if self.enums.len() > n_enums {
                    let e = self.enums.last_mut().unwrap();
                    if e.raw_comment.is_none() {
                        e.raw_comment = Some(raw);
                    }
                }
            }
        }
        Ok(TranslationUnit {
            records: std::mem::take(&mut self.records),
            enums: std::mem::take(&mut self.enums),
            typedefs: std::mem::take(&mut self.typedefs),
        })
    }
}

fn int_literal_value(base: IntBase, repr: &str) -> Result<i64> {
    let digits: String = repr
        .chars()
        .filter(|c| !matches!(c, 'u' | 'U' | 'l' | 'L' | 'z' | 'Z'))
        .collect();
    let v = match base {
        IntBase::Hex => {
            let hex = digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
                .unwrap_or(&digits);
            u64::from_str_radix(hex, 16)
        }
        IntBase::Oct => u64::from_str_radix(&digits[1..], 8),
        IntBase::Dec => digits.parse::<u64>(),
    };
    let v = v.with_context(|| format!("invalid integer literal: {}", repr))?;
    Ok(v as i64)
}

pub fn parse_translation_unit(src: &str) -> Result<TranslationUnit> {
    let mut p = Parser::from_source(src);
    p.parse_translation_unit()
        .context("failed to parse translation unit")
}
