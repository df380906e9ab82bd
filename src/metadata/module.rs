//! The mutable module tree.
//!
//! A [`Module`] owns everything the rewrite passes touch: the assembly references, the
//! `TypeRef` table, the type definition tree, module-level custom attributes and assembly-level
//! security declarations. Rows added during rewriting draw their tokens from a
//! [`TokenAllocator`] seeded past the highest existing row of each table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        token::{TableId, Token},
        typesystem::{
            CustomAttribute, MethodDef, ResolutionScope, SecurityDeclaration, TypeDef, TypeRef,
        },
    },
    Result,
};

/// Hands out tokens for newly appended rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAllocator {
    next_rows: HashMap<TableId, u32>,
}

impl TokenAllocator {
    /// Note that `token` is in use, so future allocations of its table land after it
    pub fn reserve(&mut self, table: TableId, token: Token) {
        let next = self.next_rows.entry(table).or_insert(1);
        *next = (*next).max(token.row() + 1);
    }

    /// Allocate the next free token of `table`
    pub fn next_token(&mut self, table: TableId) -> Token {
        let next = self.next_rows.entry(table).or_insert(1);
        let token = Token::from_parts(table, *next);
        *next += 1;
        token
    }
}

/// A loaded module.
///
/// Equality compares the metadata content and ignores allocator state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Module file name, e.g. `Assembly-CSharp.dll`
    pub name: String,
    /// Identity of the assembly this module belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly: Option<AssemblyIdentity>,
    /// `AssemblyRef` table, in row order
    #[serde(default)]
    pub assembly_refs: Vec<AssemblyIdentity>,
    /// `TypeRef` table, in row order
    #[serde(default)]
    pub type_refs: Vec<TypeRef>,
    /// Top-level type definitions
    #[serde(default)]
    pub types: Vec<TypeDef>,
    /// Assembly and module level custom attributes
    #[serde(default)]
    pub custom_attributes: Vec<CustomAttribute>,
    /// Assembly level declarative security
    #[serde(default)]
    pub security_declarations: Vec<SecurityDeclaration>,
    #[serde(skip)]
    allocator: TokenAllocator,
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.assembly == other.assembly
            && self.assembly_refs == other.assembly_refs
            && self.type_refs == other.type_refs
            && self.types == other.types
            && self.custom_attributes == other.custom_attributes
            && self.security_declarations == other.security_declarations
    }
}

impl Module {
    /// Create an empty module
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assembly: None,
            assembly_refs: Vec::new(),
            type_refs: Vec::new(),
            types: Vec::new(),
            custom_attributes: Vec::new(),
            security_declarations: Vec::new(),
            allocator: TokenAllocator::default(),
        }
    }

    /// True if an `AssemblyRef` row names `library`
    #[must_use]
    pub fn references_assembly(&self, library: &str) -> bool {
        self.assembly_refs.iter().any(|r| r.name == library)
    }

    /// Append `identity` to the `AssemblyRef` table unless an equal identity is present.
    ///
    /// Returns true if a row was added.
    pub fn register_assembly_ref(&mut self, identity: &AssemblyIdentity) -> bool {
        if self.assembly_refs.contains(identity) {
            return false;
        }
        self.assembly_refs.push(identity.clone());
        true
    }

    /// Add every assembly used as a type-reference scope to the `AssemblyRef` table.
    ///
    /// Returns the number of rows added.
    pub fn register_scope_assemblies(&mut self) -> usize {
        let scopes: Vec<AssemblyIdentity> = self
            .type_refs
            .iter()
            .filter_map(|r| match &r.scope {
                Some(ResolutionScope::AssemblyRef(identity)) => Some(identity.clone()),
                _ => None,
            })
            .collect();

        let mut added = 0;
        for identity in &scopes {
            if self.register_assembly_ref(identity) {
                added += 1;
            }
        }
        added
    }

    /// The type tree together with the allocator for new rows.
    ///
    /// The passes mutate one type while allocating tokens module-wide; splitting the borrow
    /// lets both happen at once.
    pub fn types_mut(&mut self) -> (&mut [TypeDef], &mut TokenAllocator) {
        (&mut self.types, &mut self.allocator)
    }

    /// Allocate a token for a new row of `table`
    pub fn allocate_token(&mut self, table: TableId) -> Token {
        self.allocator.next_token(table)
    }

    /// Visit every type, nested types included, depth first
    pub fn for_each_type(&self, mut f: impl FnMut(&TypeDef)) {
        for ty in &self.types {
            ty.for_each_type(&mut f);
        }
    }

    /// Visit every method of every type
    pub fn for_each_method(&self, mut f: impl FnMut(&TypeDef, &MethodDef)) {
        self.for_each_type(|ty| {
            for method in &ty.methods {
                f(ty, method);
            }
        });
    }

    /// Visit every security declaration: assembly level, then per type and per method,
    /// nested types included.
    pub fn for_each_security_declaration_mut(&mut self, mut f: impl FnMut(&mut SecurityDeclaration)) {
        fn visit(ty: &mut TypeDef, f: &mut dyn FnMut(&mut SecurityDeclaration)) {
            ty.security_declarations.iter_mut().for_each(&mut *f);
            for method in &mut ty.methods {
                method.security_declarations.iter_mut().for_each(&mut *f);
            }
            for nested in &mut ty.nested_types {
                visit(nested, f);
            }
        }

        self.security_declarations.iter_mut().for_each(&mut f);
        for ty in &mut self.types {
            visit(ty, &mut f);
        }
    }

    /// Recompute the token allocator from the rows present.
    ///
    /// Called by stores after deserialization.
    pub fn reindex(&mut self) {
        let mut allocator = TokenAllocator::default();
        for type_ref in &self.type_refs {
            allocator.reserve(TableId::TypeRef, type_ref.token);
        }
        self.for_each_type(|ty| {
            allocator.reserve(TableId::TypeDef, ty.token);
            for field in &ty.fields {
                allocator.reserve(TableId::Field, field.token);
            }
            for method in &ty.methods {
                allocator.reserve(TableId::MethodDef, method.token);
            }
        });
        self.allocator = allocator;
    }

    /// Check the structural invariants of the module.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when a token is in the wrong table or duplicated,
    /// when a native-interop stub has a body or a regular method lacks one, or when a method's
    /// `STATIC` flag disagrees with its signature.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for type_ref in &self.type_refs {
            if !type_ref.token.is_table(TableId::TypeRef) || !seen.insert(type_ref.token) {
                return Err(malformed_error!(
                    "Invalid or duplicate TypeRef token {} for '{}'",
                    type_ref.token,
                    type_ref.full_name()
                ));
            }
        }

        let mut failure = None;
        self.for_each_type(|ty| {
            if failure.is_some() {
                return;
            }
            if !ty.token.is_table(TableId::TypeDef) || !seen.insert(ty.token) {
                failure = Some(malformed_error!(
                    "Invalid or duplicate TypeDef token {} for '{}'",
                    ty.token,
                    ty.full_name()
                ));
                return;
            }
            for field in &ty.fields {
                if !field.token.is_table(TableId::Field) || !seen.insert(field.token) {
                    failure = Some(malformed_error!(
                        "Invalid or duplicate Field token {} for '{}::{}'",
                        field.token,
                        ty.full_name(),
                        field.name
                    ));
                    return;
                }
            }
            for method in &ty.methods {
                let name = format!("{}::{}", ty.full_name(), method.name);
                if !method.token.is_table(TableId::MethodDef) || !seen.insert(method.token) {
                    failure = Some(malformed_error!(
                        "Invalid or duplicate MethodDef token {} for '{}'",
                        method.token,
                        name
                    ));
                    return;
                }
                if method.is_internal_call() == method.body.is_some() {
                    failure = Some(malformed_error!(
                        "Method '{}' must have a body exactly when it is not an internal call",
                        name
                    ));
                    return;
                }
                if method.is_static() == method.signature.has_this {
                    failure = Some(malformed_error!(
                        "Method '{}' has a STATIC flag that disagrees with its signature",
                        name
                    ));
                    return;
                }
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
