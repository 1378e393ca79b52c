//! Well-known type descriptors and their seeded mutability answers.
//!
//! The host runtimes this crate models ship a set of types whose mutability is
//! known a priori: the scalar primitives, the canonical immutable value types
//! (decimal, guid, the date/time family), the root object type and the
//! nullable wrapper template. Enumerating them here lets a fresh
//! [`crate::typesystem::TypeRegistry`] seed its descriptor table and lets a
//! fresh classifier skip the structural walk for all of them.

use strum::{EnumCount, EnumIter};

use crate::typesystem::{MutabilityFlags, Token, TypeKind, SPACE_WELL_KNOWN};

/// The fixed table of well-known types.
///
/// Each entry carries its own token (in the [`SPACE_WELL_KNOWN`] descriptor
/// space), its structural kind and its pre-seeded [`MutabilityFlags`]. The
/// set is iterable via [`strum::IntoEnumIterator`], which is how registries
/// and classifiers seed themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum WellKnown {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
    /// System.Object - base class for all reference types
    Object,
    /// System.String - immutable string of Unicode characters
    String,
    /// System.Decimal - 128-bit decimal number
    Decimal,
    /// System.Guid - globally unique identifier
    Guid,
    /// System.DateTime - point in time
    DateTime,
    /// System.DateTimeOffset - point in time with UTC offset
    DateTimeOffset,
    /// System.TimeSpan - duration
    TimeSpan,
    /// System.Nullable`1 - the canonical optional-value wrapper template
    Nullable,
}

impl WellKnown {
    /// Get the token for this well-known type
    #[must_use]
    pub fn token(&self) -> Token {
        let row = match self {
            WellKnown::Void => 0x01,
            WellKnown::Boolean => 0x02,
            WellKnown::Char => 0x03,
            WellKnown::I1 => 0x04,
            WellKnown::U1 => 0x05,
            WellKnown::I2 => 0x06,
            WellKnown::U2 => 0x07,
            WellKnown::I4 => 0x08,
            WellKnown::U4 => 0x09,
            WellKnown::I8 => 0x0A,
            WellKnown::U8 => 0x0B,
            WellKnown::R4 => 0x0C,
            WellKnown::R8 => 0x0D,
            WellKnown::I => 0x0E,
            WellKnown::U => 0x0F,
            WellKnown::Object => 0x10,
            WellKnown::String => 0x11,
            WellKnown::Decimal => 0x12,
            WellKnown::Guid => 0x13,
            WellKnown::DateTime => 0x14,
            WellKnown::DateTimeOffset => 0x15,
            WellKnown::TimeSpan => 0x16,
            WellKnown::Nullable => 0x17,
        };
        Token::new(u32::from(SPACE_WELL_KNOWN) << 24 | row)
    }

    /// The namespace of this well-known type
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// The simple name of this well-known type
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            WellKnown::Void => "Void",
            WellKnown::Boolean => "Boolean",
            WellKnown::Char => "Char",
            WellKnown::I1 => "SByte",
            WellKnown::U1 => "Byte",
            WellKnown::I2 => "Int16",
            WellKnown::U2 => "UInt16",
            WellKnown::I4 => "Int32",
            WellKnown::U4 => "UInt32",
            WellKnown::I8 => "Int64",
            WellKnown::U8 => "UInt64",
            WellKnown::R4 => "Single",
            WellKnown::R8 => "Double",
            WellKnown::I => "IntPtr",
            WellKnown::U => "UIntPtr",
            WellKnown::Object => "Object",
            WellKnown::String => "String",
            WellKnown::Decimal => "Decimal",
            WellKnown::Guid => "Guid",
            WellKnown::DateTime => "DateTime",
            WellKnown::DateTimeOffset => "DateTimeOffset",
            WellKnown::TimeSpan => "TimeSpan",
            WellKnown::Nullable => "Nullable`1",
        }
    }

    /// The structural kind of this well-known type
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self {
            WellKnown::Void
            | WellKnown::Boolean
            | WellKnown::Char
            | WellKnown::I1
            | WellKnown::U1
            | WellKnown::I2
            | WellKnown::U2
            | WellKnown::I4
            | WellKnown::U4
            | WellKnown::I8
            | WellKnown::U8
            | WellKnown::R4
            | WellKnown::R8
            | WellKnown::I
            | WellKnown::U => TypeKind::Primitive,
            WellKnown::Object | WellKnown::String => TypeKind::Class,
            WellKnown::Decimal
            | WellKnown::Guid
            | WellKnown::DateTime
            | WellKnown::DateTimeOffset
            | WellKnown::TimeSpan
            | WellKnown::Nullable => TypeKind::ValueType,
        }
    }

    /// Whether further subtypes of this type can exist at runtime
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        // Object is the one open root; value types and String are closed.
        !matches!(self, WellKnown::Object)
    }

    /// The pre-seeded mutability answer for this type
    #[must_use]
    pub fn mutability(&self) -> MutabilityFlags {
        match self {
            WellKnown::Object => MutabilityFlags::OPEN_TYPE,
            WellKnown::Nullable => MutabilityFlags::OPEN_GENERIC,
            _ => MutabilityFlags::IMMUTABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_tokens_are_unique_and_well_known() {
        let mut seen = HashSet::new();
        for wk in WellKnown::iter() {
            let token = wk.token();
            assert!(token.is_well_known(), "{:?} not in well-known space", wk);
            assert!(seen.insert(token), "duplicate token for {:?}", wk);
        }
        assert_eq!(seen.len(), WellKnown::COUNT);
    }

    #[test]
    fn test_seeded_mutability() {
        assert_eq!(WellKnown::Boolean.mutability(), MutabilityFlags::IMMUTABLE);
        assert_eq!(WellKnown::String.mutability(), MutabilityFlags::IMMUTABLE);
        assert_eq!(WellKnown::Object.mutability(), MutabilityFlags::OPEN_TYPE);
        assert_eq!(
            WellKnown::Nullable.mutability(),
            MutabilityFlags::OPEN_GENERIC
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(WellKnown::I4.kind(), TypeKind::Primitive);
        assert_eq!(WellKnown::Object.kind(), TypeKind::Class);
        assert_eq!(WellKnown::Guid.kind(), TypeKind::ValueType);
        assert_eq!(WellKnown::Nullable.kind(), TypeKind::ValueType);
    }

    #[test]
    fn test_names() {
        assert_eq!(WellKnown::U1.name(), "Byte");
        assert_eq!(WellKnown::Nullable.name(), "Nullable`1");
        assert_eq!(WellKnown::Boolean.namespace(), "System");
    }
}
