use std::fmt;
use std::hash::{Hash, Hasher};

/// Descriptor space for well-known types seeded by the library itself.
pub const SPACE_WELL_KNOWN: u8 = 0xF0;
/// Descriptor space for types allocated through a [`crate::typesystem::TypeRegistry`].
pub const SPACE_REGISTRY: u8 = 0x02;

/// A token identifying a type descriptor.
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the descriptor space
/// - The low 24 bits (bits 0-23) indicate the row index within that space
///
/// Two descriptors are the same type exactly when their tokens are equal;
/// tokens are the equality and hashing key for every cache and index in
/// this crate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the descriptor space from the token (high byte)
    #[must_use]
    pub fn space(&self) -> u8 {
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

    /// Returns true if this token lives in the well-known descriptor space
    #[must_use]
    pub fn is_well_known(&self) -> bool {
        self.space() == SPACE_WELL_KNOWN
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
            "Token(0x{:08x}, space: 0x{:02x}, row: {})",
            self.0,
            self.space(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_new() {
        let token = Token::new(0x02000001);
        assert_eq!(token.value(), 0x02000001);
    }

    #[test]
    fn test_token_space() {
        let token = Token(0xF0000001);
        assert_eq!(token.space(), 0xF0);

        let token2 = Token(0x02000005);
        assert_eq!(token2.space(), 0x02);

        let token3 = Token(0x00000000);
        assert_eq!(token3.space(), 0x00);
    }

    #[test]
    fn test_token_row() {
        let token = Token(0x02000001);
        assert_eq!(token.row(), 1);

        let token2 = Token(0xF0000005);
        assert_eq!(token2.row(), 5);

        let token3 = Token(0x02FFFFFF);
        assert_eq!(token3.row(), 0x00FFFFFF);
    }

    #[test]
    fn test_token_is_null() {
        let null_token = Token(0x00000000);
        assert!(null_token.is_null());

        let non_null_token = Token(0x02000001);
        assert!(!non_null_token.is_null());
    }

    #[test]
    fn test_token_is_well_known() {
        assert!(Token(0xF0000001).is_well_known());
        assert!(!Token(0x02000001).is_well_known());
    }

    #[test]
    fn test_token_from_conversion() {
        let value = 0x02000001u32;
        let token: Token = value.into();
        assert_eq!(token.value(), value);

        let back_to_u32: u32 = token.into();
        assert_eq!(back_to_u32, value);
    }

    #[test]
    fn test_token_display() {
        let token = Token(0x02000001);
        assert_eq!(format!("{}", token), "0x02000001");

        let token2 = Token(0x00000000);
        assert_eq!(format!("{}", token2), "0x00000000");
    }

    #[test]
    fn test_token_debug() {
        let token = Token(0xF0000001);
        let debug_str = format!("{:?}", token);
        assert!(debug_str.contains("Token(0xf0000001"));
        assert!(debug_str.contains("space: 0xf0"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_equality() {
        let token1 = Token(0x02000001);
        let token2 = Token(0x02000001);
        let token3 = Token(0x02000002);

        assert_eq!(token1, token2);
        assert_ne!(token1, token3);
    }

    #[test]
    fn test_token_ordering() {
        let token1 = Token(0x02000001);
        let token2 = Token(0x02000002);
        let token3 = Token(0xF0000001);

        assert!(token1 < token2);
        assert!(token2 < token3);
    }

    #[test]
    fn test_token_hash() {
        let mut map = HashMap::new();
        let token1 = Token(0x02000001);
        let token2 = Token(0x02000002);

        map.insert(token1, "First");
        map.insert(token2, "Second");

        assert_eq!(map.get(&token1), Some(&"First"));
        assert_eq!(map.get(&token2), Some(&"Second"));
    }
}
