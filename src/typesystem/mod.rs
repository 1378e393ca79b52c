//! Type descriptor model and mutability classification.
//!
//! This module provides everything needed to answer one question about an
//! arbitrary runtime type: can its instances ever be observed changing after
//! construction? It bridges the gap between a host runtime's raw reflection
//! facility and a cheap, repeatable structural mutability query.
//!
//! # Key Components
//!
//! - [`TypeDesc`]: Concrete type descriptor (kind, fields, generic relationship)
//! - [`TypeRegistry`]: Central registry for all descriptors, pre-seeded with well-known types
//! - [`TypeBuilder`]: Builder pattern for constructing descriptors
//! - [`TypeIntrospect`]: Narrow capability interface the classifier is written against
//! - [`MutabilityClassifier`]: Memoized structural mutability analysis
//! - [`MemoMap`]: Concurrent compute-once cache underpinning the classifier
//!
//! # Thread Safety
//!
//! Every component in this module is designed for concurrent callers:
//! - Lock-free data structures for primary storage (`SkipMap`)
//! - Concurrent hash maps for indices and caches (`DashMap`)
//! - Atomic operations for token generation
//! - Per-key single-computation guarantee in the classification cache
//!
//! # Examples
//!
//! ```rust
//! use mutscope::typesystem::{MutabilityClassifier, MutabilityFlags, TypeRegistry, WellKnown};
//!
//! let registry = TypeRegistry::new();
//! let classifier = MutabilityClassifier::for_registry(&registry)?;
//!
//! let boolean = registry.well_known(WellKnown::Boolean)?;
//! assert_eq!(classifier.classify(&boolean)?, MutabilityFlags::IMMUTABLE);
//! # Ok::<(), mutscope::Error>(())
//! ```

mod base;
mod builder;
mod memo;
mod mutability;
mod registry;
mod token;
mod wellknown;

use std::sync::{Arc, OnceLock};

pub use base::{
    DeclaredField, FieldDesc, FieldList, TypeDescList, TypeDescRef, TypeIntrospect, TypeKind,
};
pub use builder::TypeBuilder;
pub use memo::MemoMap;
pub use mutability::{MutabilityClassifier, MutabilityFlags};
pub use registry::TypeRegistry;
pub use token::{Token, SPACE_REGISTRY, SPACE_WELL_KNOWN};
pub use wellknown::WellKnown;

use crate::Result;

/// Reference to a [`TypeDesc`]
pub type TypeDescRc = Arc<TypeDesc>;

/// A concrete type descriptor.
///
/// Combines everything the mutability classifier needs to know about a type:
/// its structural kind, sealedness, declared instance fields and its position
/// in the generic template/instantiation relationship. Descriptors are
/// identified by [`Token`]; equality and hashing go through the token alone,
/// which makes `Arc<TypeDesc>` a valid cache key.
///
/// Field and generic parameter lists are append-only (`boxcar::Vec`), so
/// mutually recursive field graphs can be knotted together after the
/// descriptors have been created.
#[derive(Debug)]
pub struct TypeDesc {
    /// Token identifying this descriptor
    pub token: Token,
    /// The structural kind
    pub kind: TypeKind,
    /// Namespace (can be empty)
    pub namespace: String,
    /// Name
    pub name: String,
    /// No further subtypes of this type can exist at runtime
    pub sealed: bool,
    /// All declared instance fields of this type
    pub fields: FieldList,
    /// Unbound generic parameter placeholders (templates only)
    pub generic_params: TypeDescList,
    /// Bound generic arguments (instantiations only)
    pub generic_args: TypeDescList,
    /// The originating template (instantiations only)
    template: OnceLock<TypeDescRc>,
}

impl TypeDesc {
    /// Create a new descriptor with empty field and generic parameter lists.
    ///
    /// ## Arguments
    /// * 'token'       - Token identifying the descriptor
    /// * 'kind'        - The structural kind
    /// * 'namespace'   - Namespace (can be empty)
    /// * 'name'        - Name
    /// * 'sealed'      - Whether further subtypes can exist at runtime
    /// * 'template'    - The originating template, for generic instantiations
    pub fn new(
        token: Token,
        kind: TypeKind,
        namespace: String,
        name: String,
        sealed: bool,
        template: Option<TypeDescRc>,
    ) -> Self {
        let template_lock = OnceLock::new();
        if let Some(template_value) = template {
            template_lock.set(template_value).ok();
        }

        TypeDesc {
            token,
            kind,
            namespace,
            name,
            sealed,
            fields: Arc::new(boxcar::Vec::new()),
            generic_params: Arc::new(boxcar::Vec::new()),
            generic_args: Arc::new(boxcar::Vec::new()),
            template: template_lock,
        }
    }

    /// Access the originating template of this descriptor, if it is a generic instantiation
    pub fn template(&self) -> Option<TypeDescRc> {
        self.template.get().cloned()
    }

    /// Returns the full name (Namespace.Name) of the descriptor
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for TypeDesc {}

impl std::hash::Hash for TypeDesc {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl TypeIntrospect for TypeDescRc {
    fn kind(&self) -> TypeKind {
        self.kind
    }

    fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn is_generic_template(&self) -> bool {
        self.generic_params.count() > 0
    }

    fn generic_template(&self) -> Option<Self> {
        self.template()
    }

    fn fields(&self) -> Result<Vec<DeclaredField<Self>>> {
        let mut declared = Vec::with_capacity(self.fields.count());
        for (_, field) in self.fields.iter() {
            let Some(field_type) = field.ty.upgrade() else {
                return Err(invalid_descriptor!(
                    "field '{}' of '{}' refers to a dropped type descriptor",
                    field.name,
                    self.fullname()
                ));
            };

            declared.push(DeclaredField {
                ty: field_type,
                read_only: field.read_only,
            });
        }

        Ok(declared)
    }

    fn fullname(&self) -> String {
        self.as_ref().fullname()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_desc_fullname() {
        let desc = TypeDesc::new(
            Token::new(0x02000001),
            TypeKind::Class,
            "System".to_string(),
            "Sample".to_string(),
            true,
            None,
        );
        assert_eq!(desc.fullname(), "System.Sample");

        let global = TypeDesc::new(
            Token::new(0x02000002),
            TypeKind::Class,
            String::new(),
            "Global".to_string(),
            true,
            None,
        );
        assert_eq!(global.fullname(), "Global");
    }

    #[test]
    fn test_type_desc_equality_by_token() {
        let a = TypeDesc::new(
            Token::new(0x02000001),
            TypeKind::Class,
            "A".to_string(),
            "First".to_string(),
            true,
            None,
        );
        let b = TypeDesc::new(
            Token::new(0x02000001),
            TypeKind::ValueType,
            "B".to_string(),
            "Second".to_string(),
            false,
            None,
        );
        let c = TypeDesc::new(
            Token::new(0x02000002),
            TypeKind::Class,
            "A".to_string(),
            "First".to_string(),
            true,
            None,
        );

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_introspect_fields_dangling() {
        let holder: TypeDescRc = Arc::new(TypeDesc::new(
            Token::new(0x02000001),
            TypeKind::Class,
            "Test".to_string(),
            "Holder".to_string(),
            true,
            None,
        ));

        {
            let dropped: TypeDescRc = Arc::new(TypeDesc::new(
                Token::new(0x02000002),
                TypeKind::Class,
                "Test".to_string(),
                "Gone".to_string(),
                true,
                None,
            ));
            holder.fields.push(FieldDesc::new("value", &dropped, false));
        }

        let err = holder.fields().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_introspect_template_relationship() {
        let template: TypeDescRc = Arc::new(TypeDesc::new(
            Token::new(0x02000001),
            TypeKind::Class,
            "Test".to_string(),
            "Wrapper`1".to_string(),
            true,
            None,
        ));
        let param: TypeDescRc = Arc::new(TypeDesc::new(
            Token::new(0x02000002),
            TypeKind::GenericParam,
            String::new(),
            "T".to_string(),
            true,
            None,
        ));
        template.generic_params.push(param);

        assert!(template.is_generic_template());
        assert!(template.generic_template().is_none());

        let instance: TypeDescRc = Arc::new(TypeDesc::new(
            Token::new(0x02000003),
            TypeKind::Class,
            "Test".to_string(),
            "Wrapper`1<System.Boolean>".to_string(),
            true,
            Some(template.clone()),
        ));

        assert!(!instance.is_generic_template());
        assert_eq!(
            instance.generic_template().map(|t| t.token),
            Some(template.token)
        );
    }
}
