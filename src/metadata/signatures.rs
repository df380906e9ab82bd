//! Type, method and field signatures.
//!
//! The representation follows ECMA-335 II.23.2: a [`TypeSignature`] is the decoded element type
//! of a blob, [`SignatureParameter`] adds the by-reference flag that a blob encodes as a
//! `BYREF` prefix, and [`SignatureMethod`] groups the calling convention, return type and
//! parameters of a method. Equality is structural, which is what accessor pairing relies on
//! when it compares a getter's value type with a setter's parameter type.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::metadata::token::Token;

/// Represents a parsed type in various signatures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum TypeSignature {
    #[default]
    /// Not defined
    Unknown,
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Unmanaged pointer to a type
    Ptr(Box<TypeSignature>),
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// CIL value-type, `TypeDefOrRef` token
    ValueType(Token),
    /// CIL class, `TypeDefOrRef` token
    Class(Token),
    /// Generic type parameter, index into the declaring type's parameters
    GenericParamType(u32),
    /// Generic method parameter, index into the declaring method's parameters
    GenericParamMethod(u32),
    /// Single dimension, zero-based array
    SzArray(Box<TypeSignature>),
    /// Multi-dimensional array with its rank
    Array(Box<TypeSignature>, u32),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Typed reference
    TypedByRef,
}

impl TypeSignature {
    /// If this signature is a by-reference type, return the referenced type.
    #[must_use]
    pub fn dereferenced(&self) -> Option<&TypeSignature> {
        match self {
            TypeSignature::ByRef(inner) => Some(inner),
            _ => None,
        }
    }

    /// The `TypeDefOrRef` token of a concrete defined type.
    ///
    /// Only `ValueType` and `Class` signatures with a non-null token qualify; primitives,
    /// generic parameters and instantiations, arrays and pointers do not name a single row
    /// that a `cpobj`/`initobj` operand could address.
    #[must_use]
    pub fn defined_type_token(&self) -> Option<Token> {
        match self {
            TypeSignature::ValueType(token) | TypeSignature::Class(token) if !token.is_null() => {
                Some(*token)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Unknown => f.write_str("?"),
            TypeSignature::Void => f.write_str("System.Void"),
            TypeSignature::Boolean => f.write_str("System.Boolean"),
            TypeSignature::Char => f.write_str("System.Char"),
            TypeSignature::I1 => f.write_str("System.SByte"),
            TypeSignature::U1 => f.write_str("System.Byte"),
            TypeSignature::I2 => f.write_str("System.Int16"),
            TypeSignature::U2 => f.write_str("System.UInt16"),
            TypeSignature::I4 => f.write_str("System.Int32"),
            TypeSignature::U4 => f.write_str("System.UInt32"),
            TypeSignature::I8 => f.write_str("System.Int64"),
            TypeSignature::U8 => f.write_str("System.UInt64"),
            TypeSignature::R4 => f.write_str("System.Single"),
            TypeSignature::R8 => f.write_str("System.Double"),
            TypeSignature::I => f.write_str("System.IntPtr"),
            TypeSignature::U => f.write_str("System.UIntPtr"),
            TypeSignature::String => f.write_str("System.String"),
            TypeSignature::Object => f.write_str("System.Object"),
            TypeSignature::TypedByRef => f.write_str("System.TypedReference"),
            TypeSignature::Ptr(inner) => write!(f, "{inner}*"),
            TypeSignature::ByRef(inner) => write!(f, "{inner}&"),
            TypeSignature::ValueType(token) => write!(f, "valuetype {token}"),
            TypeSignature::Class(token) => write!(f, "class {token}"),
            TypeSignature::GenericParamType(index) => write!(f, "!{index}"),
            TypeSignature::GenericParamMethod(index) => write!(f, "!!{index}"),
            TypeSignature::SzArray(inner) => write!(f, "{inner}[]"),
            TypeSignature::Array(inner, rank) => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                write!(f, "{inner}[{commas}]")
            }
            TypeSignature::GenericInst(base, args) => {
                write!(f, "{base}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Parameter or return type, with the by-reference flag kept apart from the base type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignatureParameter {
    /// Parameter is passed by reference
    #[serde(default)]
    pub by_ref: bool,
    /// The type of the parameter
    pub base: TypeSignature,
}

impl SignatureParameter {
    /// A by-value parameter of type `base`
    #[must_use]
    pub fn value(base: TypeSignature) -> Self {
        Self {
            by_ref: false,
            base,
        }
    }

    /// A by-reference (`ref`/`out`) parameter of type `base`
    #[must_use]
    pub fn by_ref(base: TypeSignature) -> Self {
        Self { by_ref: true, base }
    }

    /// The full type of the parameter, `ByRef(base)` when passed by reference.
    #[must_use]
    pub fn full_type(&self) -> TypeSignature {
        if self.by_ref {
            TypeSignature::ByRef(Box::new(self.base.clone()))
        } else {
            self.base.clone()
        }
    }

    /// The dereferenced type of a by-reference parameter.
    #[must_use]
    pub fn dereferenced(&self) -> Option<&TypeSignature> {
        if self.by_ref {
            Some(&self.base)
        } else {
            self.base.dereferenced()
        }
    }

    /// True for a by-value `void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        !self.by_ref && self.base == TypeSignature::Void
    }
}

impl fmt::Display for SignatureParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_ref {
            write!(f, "{}&", self.base)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

/// Represents a method signature (II.23.2.1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureMethod {
    /// Used to encode the keyword instance in the calling convention, see §II.15.3
    pub has_this: bool,
    /// The return type of this `Method`
    pub return_type: SignatureParameter,
    /// The parameters of this `Method`
    #[serde(default)]
    pub params: Vec<SignatureParameter>,
}

impl Default for SignatureMethod {
    fn default() -> Self {
        Self {
            has_this: true,
            return_type: SignatureParameter::value(TypeSignature::Void),
            params: Vec::new(),
        }
    }
}

impl SignatureMethod {
    /// Instance method signature
    #[must_use]
    pub fn instance(return_type: SignatureParameter, params: Vec<SignatureParameter>) -> Self {
        Self {
            has_this: true,
            return_type,
            params,
        }
    }

    /// Static method signature
    #[must_use]
    pub fn static_method(return_type: SignatureParameter, params: Vec<SignatureParameter>) -> Self {
        Self {
            has_this: false,
            return_type,
            params,
        }
    }

    /// True when the method returns a value
    #[must_use]
    pub fn returns_value(&self) -> bool {
        !self.return_type.is_void()
    }

    /// Parameter list formatted as `(T1,T2)`
    #[must_use]
    pub fn param_list(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("({})", params.join(","))
    }
}

/// Strategy class of a stub method's return type.
///
/// Computed once per return type and matched exhaustively when a dummy body is synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCategory {
    /// No return value
    Void,
    /// A defined value type; zero is produced through a zero-initialized local
    DefinedValueType(Token),
    /// Values carried on the stack as `int32` (bool, char, 8/16/32-bit integers)
    Int32,
    /// 64-bit integers
    Int64,
    /// Native-width integers and unmanaged pointers
    NativeInt,
    /// `float32`
    Float32,
    /// `float64`
    Float64,
    /// Object references, including strings, arrays and generic class instances
    Reference,
    /// Anything without a direct zero-value rule (generic parameters, generic value-type
    /// instances, typed references, by-ref returns, undecoded types)
    Unrepresentable,
}

impl ReturnCategory {
    /// Classify a method's return type
    #[must_use]
    pub fn classify(return_type: &SignatureParameter) -> Self {
        if return_type.by_ref {
            return ReturnCategory::Unrepresentable;
        }

        match &return_type.base {
            TypeSignature::Void => ReturnCategory::Void,
            TypeSignature::Boolean
            | TypeSignature::Char
            | TypeSignature::I1
            | TypeSignature::U1
            | TypeSignature::I2
            | TypeSignature::U2
            | TypeSignature::I4
            | TypeSignature::U4 => ReturnCategory::Int32,
            TypeSignature::I8 | TypeSignature::U8 => ReturnCategory::Int64,
            TypeSignature::I | TypeSignature::U | TypeSignature::Ptr(_) => {
                ReturnCategory::NativeInt
            }
            TypeSignature::R4 => ReturnCategory::Float32,
            TypeSignature::R8 => ReturnCategory::Float64,
            TypeSignature::ValueType(token) if !token.is_null() => {
                ReturnCategory::DefinedValueType(*token)
            }
            TypeSignature::String
            | TypeSignature::Object
            | TypeSignature::Class(_)
            | TypeSignature::SzArray(_)
            | TypeSignature::Array(..) => ReturnCategory::Reference,
            TypeSignature::GenericInst(base, _) if matches!(**base, TypeSignature::Class(_)) => {
                ReturnCategory::Reference
            }
            TypeSignature::ValueType(_)
            | TypeSignature::GenericInst(..)
            | TypeSignature::GenericParamType(_)
            | TypeSignature::GenericParamMethod(_)
            | TypeSignature::TypedByRef
            | TypeSignature::ByRef(_)
            | TypeSignature::Unknown => ReturnCategory::Unrepresentable,
        }
    }
}
