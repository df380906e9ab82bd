//! Metadata model of a managed module.
//!
//! The model covers what retargeting reads and rewrites:
//!
//! - [`token`] - metadata tokens and the tables they address
//! - [`identity`] - assembly identities used as resolution scopes
//! - [`signatures`] - type, parameter and method signatures, return-type classification
//! - [`typesystem`] - type references, type definitions, methods, fields, attributes
//! - [`module`] - the module tree and row allocation

pub mod identity;
pub mod module;
pub mod signatures;
pub mod token;
pub mod typesystem;
