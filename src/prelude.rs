//! # mutscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the mutscope library. Import this module to get quick access to the essential
//! types for modeling and classifying runtime type descriptors.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all mutscope operations
pub use crate::Error;

/// The result type used throughout mutscope
pub use crate::Result;

// ================================================================================================
// Descriptor Model
// ================================================================================================

/// Compact descriptor identity
pub use crate::typesystem::Token;

/// Core descriptor types and the introspection seam
pub use crate::typesystem::{
    DeclaredField, FieldDesc, TypeDesc, TypeDescRc, TypeDescRef, TypeIntrospect, TypeKind,
};

// ================================================================================================
// Registry and Construction
// ================================================================================================

/// Concurrent descriptor storage and fluent construction
pub use crate::typesystem::{TypeBuilder, TypeRegistry, WellKnown};

// ================================================================================================
// Classification
// ================================================================================================

/// The memoized classification service and its result bitmask
pub use crate::typesystem::{MemoMap, MutabilityClassifier, MutabilityFlags};
