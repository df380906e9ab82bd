//! Cross-library type-reference remapping.

use log::{debug, warn};

use crate::{
    metadata::typesystem::{ResolutionScope, TypeRef, NESTED_TYPE_SEPARATOR},
    retarget::MappingTable,
};

/// Rewrites resolution scopes of type references that point at the mapping's source library.
pub struct TypeRefRemapper<'a> {
    mapping: &'a MappingTable,
}

impl<'a> TypeRefRemapper<'a> {
    /// Create a remapper over `mapping`
    #[must_use]
    pub fn new(mapping: &'a MappingTable) -> Self {
        Self { mapping }
    }

    /// Retarget a single reference.
    ///
    /// References without a scope, or whose scope is not the source library, are left alone.
    /// Nested references are looked up by their declaring type. Returns true if the scope was
    /// replaced; an unmapped type is logged and left pointing at the source library.
    pub fn remap(&self, type_ref: &mut TypeRef) -> bool {
        let from_source = type_ref
            .scope
            .as_ref()
            .and_then(ResolutionScope::assembly_name)
            .is_some_and(|name| name == self.mapping.source());
        if !from_source {
            return false;
        }

        let full_name = type_ref.full_name();
        let declaring = full_name
            .split(NESTED_TYPE_SEPARATOR)
            .next()
            .unwrap_or(&full_name);

        match self.mapping.lookup(declaring) {
            Some(target) => {
                debug!("{full_name} -> {}", target.name);
                type_ref.scope = Some(ResolutionScope::AssemblyRef(target.clone()));
                true
            }
            None => {
                warn!("no mapping entry for type {full_name}");
                false
            }
        }
    }

    /// Retarget every reference yielded by `refs`, returning how many were patched and the
    /// full names of those left unmapped.
    pub fn remap_all<'r>(
        &self,
        refs: impl IntoIterator<Item = &'r mut TypeRef>,
    ) -> (usize, Vec<String>) {
        let mut patched = 0;
        let mut unmapped = Vec::new();
        for type_ref in refs {
            if self.remap(type_ref) {
                patched += 1;
            } else if self.is_source_scoped(type_ref) {
                unmapped.push(type_ref.full_name());
            }
        }
        (patched, unmapped)
    }

    fn is_source_scoped(&self, type_ref: &TypeRef) -> bool {
        type_ref
            .scope
            .as_ref()
            .and_then(ResolutionScope::assembly_name)
            == Some(self.mapping.source())
    }
}
