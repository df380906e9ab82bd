//! Metadata tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
///
/// Tokens are the identifiers other modules bind against, so the rewrite passes never
/// renumber an existing token; new rows are appended after the last row of their table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token for `row` of `table`
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the token addresses a row of `table`
    #[must_use]
    pub fn is_table(&self, table: TableId) -> bool {
        self.table() == table as u8
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Metadata tables whose rows the module model addresses by token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[repr(u8)]
pub enum TableId {
    /// `TypeRef` (0x01)
    TypeRef = 0x01,
    /// `TypeDef` (0x02)
    TypeDef = 0x02,
    /// `Field` (0x04)
    Field = 0x04,
    /// `MethodDef` (0x06)
    MethodDef = 0x06,
    /// `MemberRef` (0x0A)
    MemberRef = 0x0A,
    /// `StandAloneSig` (0x11)
    StandAloneSig = 0x11,
    /// `AssemblyRef` (0x23)
    AssemblyRef = 0x23,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_parts() {
        let token = Token(0x06000001);
        assert_eq!(token.value(), 0x06000001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.row(), 1);

        let token2 = Token(0x06FFFFFF);
        assert_eq!(token2.row(), 0x00FFFFFF);
    }

    #[test]
    fn test_token_from_parts() {
        let token = Token::from_parts(TableId::Field, 7);
        assert_eq!(token, Token(0x04000007));
        assert!(token.is_table(TableId::Field));
        assert!(!token.is_table(TableId::MethodDef));
    }

    #[test]
    fn test_token_is_null() {
        assert!(Token(0).is_null());
        assert!(!Token(0x06000001).is_null());
        assert!(Token::default().is_null());
    }

    #[test]
    fn test_token_display_and_debug() {
        let token = Token(0x06000001);
        assert_eq!(format!("{}", token), "0x06000001");

        let debug_str = format!("{:?}", token);
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_ordering() {
        let token1 = Token(0x06000001);
        let token2 = Token(0x06000002);
        let token3 = Token(0x07000001);

        assert!(token1 < token2);
        assert!(token2 < token3);
    }

    #[test]
    fn test_token_hash() {
        let mut map = HashMap::new();
        map.insert(Token(0x06000001), "first");
        map.insert(Token(0x06000002), "second");

        assert_eq!(map.get(&Token(0x06000001)), Some(&"first"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_token_serde_transparent() {
        let json = serde_json::to_string(&Token(0x04000003)).unwrap();
        assert_eq!(json, "67108867");
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Token(0x04000003));
    }
}
