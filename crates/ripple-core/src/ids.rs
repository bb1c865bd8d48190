use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Dotted Java package name (`com.example`). The empty string is the default package.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(SmolStr);

impl PackageName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(SmolStr::new(name.as_ref().trim()))
    }

    pub fn default_package() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("<default>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
}

/// Identity of a nominal type.
///
/// The qualified name uses `.` between package segments and `$` between nested type names
/// (`com.example.Outer$Inner`), so the package can always be recovered from the name alone.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId {
    name: SmolStr,
    kind: TypeKind,
}

impl TypeId {
    pub fn new(qualified_name: impl AsRef<str>, kind: TypeKind) -> Self {
        Self {
            name: SmolStr::new(qualified_name.as_ref().trim()),
            kind,
        }
    }

    pub fn class(qualified_name: impl AsRef<str>) -> Self {
        Self::new(qualified_name, TypeKind::Class)
    }

    pub fn interface(qualified_name: impl AsRef<str>) -> Self {
        Self::new(qualified_name, TypeKind::Interface)
    }

    pub fn qualified_name(&self) -> &str {
        &self.name
    }

    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(|c| c == '.' || c == '$')
            .next()
            .unwrap_or(&self.name)
    }

    pub fn package(&self) -> PackageName {
        match self.name.rfind('.') {
            Some(idx) => PackageName::new(&self.name[..idx]),
            None => PackageName::default_package(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Class => write!(f, "class {}", self.name),
            TypeKind::Interface => write!(f, "interface {}", self.name),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A method declaration: declaring type, name and erased parameter types.
///
/// Parameter types are erased on construction (see [`erase_type`]), so two handles for the same
/// declaration compare equal even when one was produced from source (`List<String>`) and the
/// other from a class file (`java.util.List`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    declaring_type: TypeId,
    name: SmolStr,
    params: Vec<SmolStr>,
}

impl MethodId {
    pub fn new<I, S>(declaring_type: TypeId, name: impl AsRef<str>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            declaring_type,
            name: SmolStr::new(name.as_ref().trim()),
            params: params.into_iter().map(|p| erase_type(p.as_ref())).collect(),
        }
    }

    pub fn declaring_type(&self) -> &TypeId {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_types(&self) -> &[SmolStr] {
        &self.params
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `name(P1, P2)` without the declaring type.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }

    /// Whether `other` has the same name and erased parameters, ignoring the declaring type.
    pub fn same_signature(&self, other: &MethodId) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.declaring_type, self.signature())
    }
}

/// Erase a Java type reference for signature comparison.
///
/// Generic arguments and package/outer-type qualifiers are dropped, varargs become arrays:
/// `java.util.Map<K, V>` → `Map`, `Map.Entry<K,V>[]` → `Entry[]`, `String...` → `String[]`.
pub fn erase_type(ty: &str) -> SmolStr {
    let mut base = String::with_capacity(ty.len());
    let mut depth = 0usize;
    for ch in ty.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_whitespace() => {}
            c => base.push(c),
        }
    }

    let mut dims = 0usize;
    let mut rest = base.as_str();
    loop {
        if let Some(stripped) = rest.strip_suffix("[]") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_suffix("...") {
            rest = stripped;
        } else {
            break;
        }
        dims += 1;
    }

    let simple = rest.rsplit(|c| c == '.' || c == '$').next().unwrap_or(rest);
    let mut out = String::with_capacity(simple.len() + dims * 2);
    out.push_str(simple);
    for _ in 0..dims {
        out.push_str("[]");
    }
    SmolStr::new(out)
}

/// Whether `name` is a valid Java identifier.
pub fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Textual reference to a method, `com.example.Foo#bar(int, String)`.
///
/// The type kind is not part of the textual form; use a type model to resolve it into a
/// [`MethodId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodRef {
    pub type_name: String,
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseMethodRefError {
    #[error("expected `Type#method(params)`, missing `#` in `{0}`")]
    MissingHash(String),
    #[error("unbalanced parameter list in `{0}`")]
    UnbalancedParams(String),
    #[error("`{0}` is not a valid method name")]
    InvalidName(String),
}

impl FromStr for MethodRef {
    type Err = ParseMethodRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (type_name, rest) = s
            .split_once('#')
            .ok_or_else(|| ParseMethodRefError::MissingHash(s.to_string()))?;

        let (name, params) = match rest.find('(') {
            Some(open) => {
                let inner = rest[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| ParseMethodRefError::UnbalancedParams(s.to_string()))?;
                (&rest[..open], split_params(inner))
            }
            None => (rest, Vec::new()),
        };

        let name = name.trim();
        if !is_java_identifier(name) {
            return Err(ParseMethodRefError::InvalidName(name.to_string()));
        }

        Ok(MethodRef {
            type_name: type_name.trim().to_string(),
            name: name.to_string(),
            params,
        })
    }
}

// Commas inside generic arguments do not separate parameters.
fn split_params(inner: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in inner.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => out.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    out.push(current);
    out.into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
