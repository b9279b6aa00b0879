use anyhow::{anyhow, bail, Result};
use parse::ast::*;
use std::collections::{HashMap, HashSet};

// Target assumptions: 32-bit pointers, 2-byte struct packing. This matches the
// memory model the emitted assembler dialect was designed around.
const SIZEOF_INT: usize = 4;
const SIZEOF_PTR: usize = 4;
const MAX_ALIGN: usize = 2;

/// Layout of one struct; offsets are queryable by member name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    pub size: usize,
    pub align: usize,
    pub members: HashMap<String, (usize, Type)>, // name -> (offset, type)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionLayout {
    pub size: usize,
    pub align: usize,
}

/// A member type reduced to what the emitter needs to format it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Scalar(Type),
    Record { size: usize },
    Array { count: usize, elem_size: usize, size: usize },
}

/// All layout facts derived from one translation unit.
#[derive(Debug, Default)]
pub struct Layouts {
    pub structs: HashMap<String, StructLayout>,
    pub unions: HashMap<String, UnionLayout>,
    typedefs: HashMap<String, Type>,
    enum_reprs: HashMap<String, Type>, // tag -> Int | UInt
}

impl Layouts {
    /// Build layouts in declaration order; member types may only refer to
    /// already-complete definitions, as in C.
    pub fn build(tu: &TranslationUnit) -> Result<Layouts> {
        let mut lay = Layouts::default();
        for (name, ty) in &tu.typedefs {
            lay.typedefs.insert(name.clone(), ty.clone());
        }
        for e in &tu.enums {
            lay.enum_reprs.insert(e.tag.clone(), enum_repr(e));
        }
        for r in &tu.records {
            match r.kind {
                RecordKind::Struct => {
                    let l = lay.build_struct_layout(r)?;
                    lay.structs.insert(r.tag.clone(), l);
                }
                RecordKind::Union => {
                    let l = lay.build_union_layout(r)?;
                    lay.unions.insert(r.tag.clone(), l);
                }
            }
        }
        Ok(lay)
    }

    fn build_struct_layout(&self, def: &RecordDef) -> Result<StructLayout> {
        let mut off = 0usize;
        let mut max_align = 1usize;
        let mut map: HashMap<String, (usize, Type)> = HashMap::new();
        for m in &def.members {
            let a = self.alignof_type(&m.ty)?;
            let s = self.sizeof_type(&m.ty)?;
            max_align = max_align.max(a);
            off = round_up(off, a);
            map.insert(m.name.clone(), (off, m.ty.clone()));
            off = off.saturating_add(s);
        }
        let align = max_align.max(1);
        Ok(StructLayout {
            size: round_up(off, align),
            align,
            members: map,
        })
    }

    fn build_union_layout(&self, def: &RecordDef) -> Result<UnionLayout> {
        let mut size = 0usize;
        let mut max_align = 1usize;
        for m in &def.members {
            max_align = max_align.max(self.alignof_type(&m.ty)?);
            size = size.max(self.sizeof_type(&m.ty)?);
        }
        let align = max_align.max(1);
        Ok(UnionLayout {
            size: round_up(size, align),
            align,
        })
    }

    pub fn sizeof_type(&self, ty: &Type) -> Result<usize> {
        let s = match ty {
            Type::Char | Type::SChar | Type::UChar => 1,
            Type::Short | Type::UShort => 2,
            Type::Int | Type::UInt | Type::Long | Type::ULong => SIZEOF_INT,
            Type::Float => 4,
            Type::Double => 8,
            Type::Pointer(_) => SIZEOF_PTR,
            Type::Array(elem, n) => n.saturating_mul(self.sizeof_type(elem)?),
            Type::Enum(_) => SIZEOF_INT,
            Type::Struct(tag) => {
                self.structs
                    .get(tag)
                    .ok_or_else(|| anyhow!("incomplete struct type: struct {}", tag))?
                    .size
            }
            Type::Union(tag) => {
                self.unions
                    .get(tag)
                    .ok_or_else(|| anyhow!("incomplete union type: union {}", tag))?
                    .size
            }
            Type::Named(_) => self.sizeof_type(&self.resolve_type(ty)?)?,
            Type::Void => bail!("void has no size"),
            Type::Func { .. } => bail!("function types have no size"),
        };
        Ok(s)
    }

    pub fn alignof_type(&self, ty: &Type) -> Result<usize> {
        let natural = match ty {
            Type::Char | Type::SChar | Type::UChar => 1,
            Type::Array(elem, _n) => return self.alignof_type(elem),
            Type::Struct(tag) => {
                return Ok(self
                    .structs
                    .get(tag)
                    .ok_or_else(|| anyhow!("incomplete struct type: struct {}", tag))?
                    .align)
            }
            Type::Union(tag) => {
                return Ok(self
                    .unions
                    .get(tag)
                    .ok_or_else(|| anyhow!("incomplete union type: union {}", tag))?
                    .align)
            }
            Type::Named(_) => return self.alignof_type(&self.resolve_type(ty)?),
            Type::Void => bail!("void has no alignment"),
            Type::Func { .. } => bail!("function types have no alignment"),
            _ => MAX_ALIGN,
        };
        Ok(natural.min(MAX_ALIGN))
    }

    /// Unwrap typedef and enum-reference layers until a concrete type is
    /// reached. A cyclic typedef chain is reported instead of looping.
    pub fn resolve_type(&self, ty: &Type) -> Result<Type> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut cur = ty.clone();
        loop {
            match cur {
                Type::Named(name) => {
                    if !seen.insert(name.clone()) {
                        bail!("cyclic typedef detected: {}", name);
                    }
                    cur = self
                        .typedefs
                        .get(&name)
                        .cloned()
                        .ok_or_else(|| anyhow!("unknown typedef name: {}", name))?;
                }
                Type::Enum(tag) => {
                    // an enum stores as its underlying integer type
                    return Ok(self
                        .enum_reprs
                        .get(&tag)
                        .cloned()
                        .unwrap_or(Type::Int));
                }
                other => return Ok(other),
            }
        }
    }

    /// Resolve a member's type for emission: a record or array (possibly
    /// reached through aliases) also surfaces its total byte size.
    pub fn resolve_member(&self, ty: &Type) -> Result<Resolved> {
        let concrete = self.resolve_type(ty)?;
        let r = match &concrete {
            Type::Struct(_) | Type::Union(_) => Resolved::Record {
                size: self.sizeof_type(&concrete)?,
            },
            Type::Array(elem, n) => Resolved::Array {
                count: *n,
                elem_size: self.sizeof_type(elem)?,
                size: self.sizeof_type(&concrete)?,
            },
            _ => Resolved::Scalar(concrete),
        };
        Ok(r)
    }

    /// Byte offset of `member` within `tag`, as laid out by this engine.
    pub fn offset_of(&self, tag: &str, member: &str) -> Result<usize> {
        let l = self
            .structs
            .get(tag)
            .ok_or_else(|| anyhow!("no layout for struct {}", tag))?;
        let (off, _) = l
            .members
            .get(member)
            .ok_or_else(|| anyhow!("struct {} has no member {}", tag, member))?;
        Ok(*off)
    }
}

fn round_up(x: usize, a: usize) -> usize {
    if a == 0 {
        x
    } else {
        (x + a - 1) / a * a
    }
}

/// C enum value assignment: first constant 0 unless explicit, then previous+1.
pub fn enum_values(def: &EnumDef) -> Vec<(String, i64)> {
    let mut out = Vec::with_capacity(def.enumerators.len());
    let mut next = 0i64;
    for e in &def.enumerators {
        let v = e.value.unwrap_or(next);
        out.push((e.name.clone(), v));
        next = v.saturating_add(1);
    }
    out
}

// int unless some value does not fit, then unsigned int. Reproduces the
// unsigned storage class of enums that contain e.g. 0xffffffff.
fn enum_repr(def: &EnumDef) -> Type {
    let fits_int = enum_values(def)
        .iter()
        .all(|(_, v)| i32::try_from(*v).is_ok());
    if fits_int {
        Type::Int
    } else {
        Type::UInt
    }
}
