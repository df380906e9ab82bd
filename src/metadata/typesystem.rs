//! Type references, type definitions and their members.
//!
//! These are the mutable nodes of a [`crate::metadata::module::Module`]. Each row keeps its
//! metadata token for the lifetime of the module; the rewrite passes change scopes, flags and
//! bodies and append new fields, but never renumber.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    assembly::MethodBody,
    metadata::{
        identity::AssemblyIdentity,
        signatures::{SignatureMethod, TypeSignature},
        token::Token,
    },
};

/// Separator between a declaring type and its nested type in a full name.
pub const NESTED_TYPE_SEPARATOR: char = '/';

bitflags! {
    /// `TypeAttributes` (II.23.1.15), the subset the model distinguishes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TypeAttributes: u32 {
        /// Visible outside the assembly
        const PUBLIC = 0x0000_0001;
        /// Nested type with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Nested type with private visibility
        const NESTED_PRIVATE = 0x0000_0003;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Abstract type
        const ABSTRACT = 0x0000_0080;
        /// Type cannot be derived from
        const SEALED = 0x0000_0100;
        /// Fields are laid out sequentially
        const SEQUENTIAL_LAYOUT = 0x0000_0008;
        /// Do not run the type initializer before first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

bitflags! {
    /// `MethodAttributes` (II.23.1.10), the subset the model distinguishes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MethodAttributes: u16 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible by everyone
        const PUBLIC = 0x0006;
        /// Defined on type, not per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Virtual method
        const VIRTUAL = 0x0040;
        /// Hide by name and signature
        const HIDE_BY_SIG = 0x0080;
        /// Method has a special name (accessors, operators)
        const SPECIAL_NAME = 0x0800;
    }
}

bitflags! {
    /// `MethodImplAttributes` (II.23.1.11), the subset the model distinguishes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MethodImplAttributes: u16 {
        /// Method implementation is native
        const NATIVE = 0x0001;
        /// Method is not inlined
        const NO_INLINING = 0x0008;
        /// Method is implemented by the runtime (native-interop stub)
        const INTERNAL_CALL = 0x1000;
        /// Method signature is not mangled to do HRESULT conversion
        const PRESERVE_SIG = 0x0080;
    }
}

bitflags! {
    /// `FieldAttributes` (II.23.1.5), the subset the model distinguishes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FieldAttributes: u16 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible by everyone
        const PUBLIC = 0x0006;
        /// Defined on type, not per instance
        const STATIC = 0x0010;
        /// Field can only be initialized
        const INIT_ONLY = 0x0020;
        /// Field is a compile-time constant
        const LITERAL = 0x0040;
    }
}

/// The library (or module) a type reference is declared to come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionScope {
    /// An external assembly
    AssemblyRef(AssemblyIdentity),
    /// Another module of the same assembly
    ModuleRef(String),
}

impl ResolutionScope {
    /// Simple name of the referenced assembly, if the scope is an assembly
    #[must_use]
    pub fn assembly_name(&self) -> Option<&str> {
        match self {
            ResolutionScope::AssemblyRef(identity) => Some(&identity.name),
            ResolutionScope::ModuleRef(_) => None,
        }
    }
}

/// A named forward reference to a type defined elsewhere (`TypeRef` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Token of the row
    pub token: Token,
    /// Namespace of the outermost declaring type
    #[serde(default)]
    pub namespace: String,
    /// Name of the outermost declaring type
    pub name: String,
    /// Nested type path below the declaring type, `Inner` or `Inner/Deeper`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<String>,
    /// Resolution scope, `None` when the row has none
    #[serde(default)]
    pub scope: Option<ResolutionScope>,
}

impl TypeRef {
    /// Create a reference to `namespace.name` in `scope`
    #[must_use]
    pub fn new(
        token: Token,
        namespace: impl Into<String>,
        name: impl Into<String>,
        scope: Option<ResolutionScope>,
    ) -> Self {
        Self {
            token,
            namespace: namespace.into(),
            name: name.into(),
            nested: None,
            scope,
        }
    }

    /// Mark this reference as addressing a nested type of `namespace.name`
    #[must_use]
    pub fn with_nested(mut self, nested: impl Into<String>) -> Self {
        self.nested = Some(nested.into());
        self
    }

    /// Full name in `Namespace.Name/Nested` form
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut full = if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        };
        if let Some(nested) = &self.nested {
            full.push(NESTED_TYPE_SEPARATOR);
            full.push_str(nested);
        }
        full
    }
}

/// A field definition (`Field` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Token of the row
    pub token: Token,
    /// Field name
    pub name: String,
    /// Field attributes
    pub flags: FieldAttributes,
    /// Field type
    pub signature: TypeSignature,
}

impl FieldDef {
    /// True for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(FieldAttributes::STATIC)
    }
}

/// A method definition (`MethodDef` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Token of the row
    pub token: Token,
    /// Method name
    pub name: String,
    /// Method attributes
    pub flags: MethodAttributes,
    /// Implementation attributes
    #[serde(default)]
    pub impl_flags: MethodImplAttributes,
    /// Method signature
    pub signature: SignatureMethod,
    /// Body; absent exactly when the method is a native-interop stub
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<MethodBody>,
    /// Declarative security attached to the method
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_declarations: Vec<SecurityDeclaration>,
}

impl MethodDef {
    /// Create a public method with the given body. `STATIC` follows the signature's `has_this`.
    #[must_use]
    pub fn new(
        token: Token,
        name: impl Into<String>,
        signature: SignatureMethod,
        body: MethodBody,
    ) -> Self {
        let mut method = Self::internal_call(token, name, signature);
        method.implement(body);
        method
    }

    /// Create a public native-interop stub. `STATIC` follows the signature's `has_this`.
    #[must_use]
    pub fn internal_call(token: Token, name: impl Into<String>, signature: SignatureMethod) -> Self {
        let mut flags = MethodAttributes::PUBLIC | MethodAttributes::HIDE_BY_SIG;
        if !signature.has_this {
            flags |= MethodAttributes::STATIC;
        }
        Self {
            token,
            name: name.into(),
            flags,
            impl_flags: MethodImplAttributes::INTERNAL_CALL,
            signature,
            body: None,
            security_declarations: Vec::new(),
        }
    }

    /// True when the method is implemented by the host runtime and carries no body
    #[must_use]
    pub fn is_internal_call(&self) -> bool {
        self.impl_flags.contains(MethodImplAttributes::INTERNAL_CALL)
    }

    /// True for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodAttributes::STATIC)
    }

    /// Replace the native-interop stub flag with a concrete body
    pub fn implement(&mut self, body: MethodBody) {
        self.impl_flags.remove(MethodImplAttributes::INTERNAL_CALL);
        self.body = Some(body);
    }
}

/// A type definition (`TypeDef` row) with its members and nested types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Token of the row
    pub token: Token,
    /// Namespace, empty for nested types
    #[serde(default)]
    pub namespace: String,
    /// Type name
    pub name: String,
    /// Type attributes
    #[serde(default)]
    pub flags: TypeAttributes,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    /// Nested types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_types: Vec<TypeDef>,
    /// Custom attributes applied to the type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,
    /// Declarative security attached to the type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_declarations: Vec<SecurityDeclaration>,
}

impl TypeDef {
    /// Create an empty type
    #[must_use]
    pub fn new(token: Token, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            token,
            namespace: namespace.into(),
            name: name.into(),
            flags: TypeAttributes::PUBLIC,
            fields: Vec::new(),
            methods: Vec::new(),
            nested_types: Vec::new(),
            custom_attributes: Vec::new(),
            security_declarations: Vec::new(),
        }
    }

    /// Full name in `Namespace.Name` form
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Look up a field by exact name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up the first method with the given name
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Visit this type and all nested types, depth first
    pub fn for_each_type(&self, f: &mut dyn FnMut(&TypeDef)) {
        f(self);
        for nested in &self.nested_types {
            nested.for_each_type(f);
        }
    }
}

/// The constructor a custom attribute is instantiated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeConstructor {
    /// Full name of the attribute type
    pub declaring_type: String,
    /// Constructor signature
    pub signature: SignatureMethod,
}

impl AttributeConstructor {
    /// Full constructor name, `System.Void Ns.Type::.ctor(System.String)`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}::.ctor{}",
            self.signature.return_type,
            self.declaring_type,
            self.signature.param_list()
        )
    }
}

/// A custom attribute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAttribute {
    /// Attribute constructor
    pub constructor: AttributeConstructor,
    /// Encoded constructor arguments and named arguments
    #[serde(default)]
    pub value: Vec<u8>,
}

/// One attribute of a declarative security permission set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAttribute {
    /// The permission attribute type. Permission sets name their attribute types by string, so
    /// these references do not appear in the module's `TypeRef` table.
    pub attribute_type: TypeRef,
    /// Encoded named arguments
    #[serde(default)]
    pub properties: Vec<u8>,
}

/// A `DeclSecurity` row: a security action and its permission set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityDeclaration {
    /// Security action code (II.22.11)
    pub action: u16,
    /// Permission attributes
    pub attributes: Vec<SecurityAttribute>,
}
