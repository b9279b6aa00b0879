pub use lex::token::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    // C89 scalar types
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Void,
    Pointer(Box<Type>),
    Array(Box<Type>, usize),
    // Tags and typedef-names (resolved by the layout engine)
    Struct(String),
    Union(String),
    Enum(String),
    Named(String),
    Func {
        ret: Box<Type>,
        params: Vec<Type>,
        variadic: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub ty: Type,
    /// Trailing same-line comment, markers stripped.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDef {
    pub kind: RecordKind,
    pub tag: String,
    pub members: Vec<Member>,
    /// Adjacent leading comment block, raw spelling, one entry per line.
    pub raw_comment: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerator {
    pub name: String,
    /// Explicit value when the source gives one.
    pub value: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub tag: String,
    pub enumerators: Vec<Enumerator>,
    pub raw_comment: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationUnit {
    pub records: Vec<RecordDef>,
    pub enums: Vec<EnumDef>,
    /// Top-level typedefs in declaration order.
    pub typedefs: Vec<(String, Type)>,
}
