//! Assembly identities used as resolution scopes.
//!
//! A type reference names the library it comes from through its resolution scope. Retargeting
//! swaps that scope for the identity of the library that now hosts the type, so every target
//! library in the mapping table is described by an [`AssemblyIdentity`] parsed from a .NET
//! display name:
//!
//! ```text
//! UnityEngine.CoreModule, Version=0.0.0.0, Culture=neutral, PublicKeyToken=null
//! ```
//!
//! # Strong Names
//!
//! The strong name may be given either as `PublicKeyToken=<16 hex chars>` or as the full
//! `PublicKey=<hex>`. Full keys are kept as-is and reduced to their token (the last 8 bytes of
//! the SHA-1 hash) whenever a display name is produced.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::{Error, Result};

/// Strong-name identity of an assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// The full RSA public-key
    PubKey(Vec<u8>),
    /// 8-byte end of the SHA-1 hash of the public-key
    Token(u64),
}

impl Identity {
    /// Get the public-key token; the token is the last 8 bytes of the SHA-1 hash of the key.
    #[must_use]
    pub fn to_token(&self) -> u64 {
        match self {
            Identity::PubKey(data) => {
                let mut hasher = Sha1::new();
                hasher.update(data);
                let result = hasher.finalize();

                let mut tail = [0u8; 8];
                tail.copy_from_slice(&result[result.len() - 8..]);
                u64::from_le_bytes(tail)
            }
            Identity::Token(token) => *token,
        }
    }
}

/// Complete identity of an assembly: simple name, version, culture and strong name.
///
/// Equality and hashing ignore the strong name, so an identity written with a full public key
/// and one written with the matching token compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g., "UnityEngine", "mscorlib").
    pub name: String,
    /// Four-part version number.
    pub version: AssemblyVersion,
    /// Culture, `None` for culture-neutral assemblies.
    pub culture: Option<String>,
    /// Strong name, `None` for `PublicKeyToken=null`.
    pub strong_name: Option<Identity>,
}

impl PartialEq for AssemblyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.culture == other.culture
    }
}

impl Eq for AssemblyIdentity {}

impl std::hash::Hash for AssemblyIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.culture.hash(state);
    }
}

/// Four-part version numbering for .NET assemblies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Build version component.
    pub build: u16,
    /// Revision version component.
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a version from its four components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a dotted version string. Missing trailing components default to zero.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for empty strings, more than four components, or components
    /// that are not 16-bit unsigned integers.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();
        if version_str.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid assembly version '{}'", version_str));
        }

        let mut components = [0u16; 4];
        for (slot, part) in components.iter_mut().zip(parts) {
            *slot = part.parse::<u16>().map_err(|_| {
                malformed_error!("Invalid version component '{}' in '{}'", part, version_str)
            })?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl AssemblyIdentity {
    /// Create a culture-neutral identity without a strong name.
    #[must_use]
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        Self {
            name: name.into(),
            version,
            culture: None,
            strong_name: None,
        }
    }

    /// Parse an assembly display name.
    ///
    /// Unknown components (such as `ProcessorArchitecture=`) are ignored.
    ///
    /// # Errors
    /// Returns an error if the name is empty or a component cannot be parsed.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut identity = Self::new(name, AssemblyVersion::default());
        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                identity.version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" && !value.is_empty() {
                    identity.culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    let token_bytes = hex::decode(value).map_err(|e| {
                        malformed_error!("Invalid hex in PublicKeyToken '{}': {}", value, e)
                    })?;
                    let token_array: [u8; 8] = token_bytes.try_into().map_err(|_| {
                        malformed_error!(
                            "PublicKeyToken must be exactly 8 bytes (16 hex characters), got '{}'",
                            value
                        )
                    })?;
                    identity.strong_name = Some(Identity::Token(u64::from_le_bytes(token_array)));
                }
            } else if let Some(value) = part.strip_prefix("PublicKey=") {
                if value != "null" && !value.is_empty() {
                    let key = hex::decode(value).map_err(|e| {
                        malformed_error!("Invalid hex in PublicKey '{}': {}", value, e)
                    })?;
                    identity.strong_name = Some(Identity::PubKey(key));
                }
            }
        }

        Ok(identity)
    }

    /// Generate the display name string for this identity.
    ///
    /// Full public keys are shown as their token.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = String::with_capacity(self.name.len() + 80);

        result.push_str(&self.name);
        let _ = write!(result, ", Version={}", self.version);
        let _ = write!(
            result,
            ", Culture={}",
            self.culture.as_deref().unwrap_or("neutral")
        );

        result.push_str(", PublicKeyToken=");
        match &self.strong_name {
            Some(identity) => result.push_str(&hex::encode(identity.to_token().to_le_bytes())),
            None => result.push_str("null"),
        }

        result
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl TryFrom<String> for AssemblyIdentity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<AssemblyIdentity> for String {
    fn from(identity: AssemblyIdentity) -> Self {
        identity.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_display_name() {
        let identity = AssemblyIdentity::parse(
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();

        assert_eq!(identity.name, "mscorlib");
        assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
        assert_eq!(identity.culture, None);
        assert_eq!(
            identity.strong_name,
            Some(Identity::Token(u64::from_le_bytes([
                0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89
            ])))
        );
        assert_eq!(
            identity.display_name(),
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
        );
    }

    #[test]
    fn parse_simple_name() {
        let identity = AssemblyIdentity::parse("UnityEngine.CoreModule").unwrap();
        assert_eq!(identity.version, AssemblyVersion::default());
        assert_eq!(
            identity.display_name(),
            "UnityEngine.CoreModule, Version=0.0.0.0, Culture=neutral, PublicKeyToken=null"
        );
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(AssemblyIdentity::parse("").is_err());
        assert!(AssemblyIdentity::parse("A, Version=1.x").is_err());
        assert!(AssemblyIdentity::parse("A, PublicKeyToken=abcd").is_err());
        assert!(AssemblyVersion::parse("1.2.3.4.5").is_err());
    }

    #[test]
    fn public_key_reduces_to_token() {
        let key = Identity::PubKey(vec![0x00, 0x24, 0x00, 0x00, 0x04, 0x80]);
        let token = key.to_token();
        assert_eq!(Identity::Token(token).to_token(), token);

        let identity = AssemblyIdentity::parse("Signed, PublicKey=002400000480").unwrap();
        assert_eq!(identity.strong_name, Some(key));
        assert!(identity.display_name().ends_with(&hex::encode(token.to_le_bytes())));
    }

    #[test]
    fn equality_ignores_strong_name() {
        let mut a = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        let b = a.clone();
        a.strong_name = Some(Identity::Token(42));
        assert_eq!(a, b);
    }

    #[test]
    fn serde_uses_display_name() {
        let identity = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 2, 3, 4));
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(
            json,
            "\"Lib, Version=1.2.3.4, Culture=neutral, PublicKeyToken=null\""
        );
        let back: AssemblyIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }
}
