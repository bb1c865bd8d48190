use ripple_core::TypeKind;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

/// Declaration of a method as it appears in source or in a class file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    /// Parameter types as written; erased when the universe is built.
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub access: Access,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub constructor: bool,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, access: Access) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            access,
            is_static: false,
            constructor: false,
        }
    }

    pub fn public(name: impl Into<String>) -> Self {
        Self::new(name, Access::Public)
    }

    pub fn package_private(name: impl Into<String>) -> Self {
        Self::new(name, Access::Package)
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_constructor(mut self) -> Self {
        self.constructor = true;
        self
    }

    pub fn is_virtual(&self) -> bool {
        self.access != Access::Private && !self.is_static && !self.constructor
    }
}

/// Declaration of a class or interface.
///
/// `name` is the qualified name with `$` separating nested types. For interfaces,
/// `interfaces` lists the extended interfaces and `super_class` must be empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, rename = "extends")]
    pub super_class: Option<String>,
    #[serde(default, alias = "implements")]
    pub interfaces: Vec<String>,
    /// Compilation unit (or class file) holding the declaration. Derived from the outermost
    /// type name when absent.
    #[serde(default)]
    pub compilation_unit: Option<String>,
    /// Loaded from compiled code rather than from source.
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            super_class: None,
            interfaces: Vec::new(),
            compilation_unit: None,
            binary: false,
            methods: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn extends(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn implements<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces.extend(interfaces.into_iter().map(Into::into));
        self
    }

    pub fn in_unit(mut self, unit: impl Into<String>) -> Self {
        self.compilation_unit = Some(unit.into());
        self
    }

    pub fn binary(mut self) -> Self {
        self.binary = true;
        self
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub(crate) fn default_unit(&self) -> String {
        let outer = self.name.split('$').next().unwrap_or(&self.name);
        let path = outer.replace('.', "/");
        if self.binary {
            format!("{path}.class")
        } else {
            format!("{path}.java")
        }
    }
}
