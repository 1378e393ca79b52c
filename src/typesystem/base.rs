use std::{
    hash::Hash,
    sync::{Arc, Weak},
};

use crate::{
    typesystem::{Token, TypeDesc, TypeDescRc},
    Result,
};

/// A vector that holds [`FieldDesc`] instances
pub type FieldList = Arc<boxcar::Vec<FieldDesc>>;
/// A vector that holds `TypeDescRc` instances (strong references)
pub type TypeDescList = Arc<boxcar::Vec<TypeDescRc>>;

/// The structural kind of a type descriptor.
///
/// The template/instantiation relationship is a separate axis, queried through
/// [`TypeIntrospect::is_generic_template`] and [`TypeIntrospect::generic_template`]:
/// both a generic class template and its closed instantiations report
/// [`TypeKind::Class`] here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Built-in scalar type whose instances carry no mutable state
    Primitive,
    /// Named constant set over an integral underlying type
    Enum,
    /// Pure contract type; any number of implementations can exist at runtime
    Interface,
    /// Aggregate with value semantics (copied on assignment)
    ValueType,
    /// Aggregate with reference semantics (shared through aliases)
    Class,
    /// Array type; elements are reassignable by construction
    Array,
    /// Delegate / function-pointer type; the callable target is fixed at construction
    Delegate,
    /// Unbound generic parameter of a template (the `T` in `List<T>`)
    GenericParam,
}

/// A declared instance field as seen through the introspection interface.
///
/// This is the trait-level view: the concrete descriptor model exposes richer
/// per-field data (see [`FieldDesc`]), but the classifier only needs the field
/// type and whether the field can be reassigned after construction.
#[derive(Debug, Clone)]
pub struct DeclaredField<D> {
    /// Declared type of the field
    pub ty: D,
    /// Field cannot be reassigned after construction (read-only / final)
    pub read_only: bool,
}

/// Narrow capability interface over a host runtime's type introspection.
///
/// The mutability classifier is written against this trait so it stays portable
/// across hosts whose reflection facilities differ in richness. Implementors are
/// handles: cheap to clone, compared and hashed by type identity, so they can
/// serve directly as cache keys.
///
/// The crate ships one implementation, [`TypeDescRc`], backed by the in-crate
/// descriptor model and [`crate::typesystem::TypeRegistry`].
pub trait TypeIntrospect: Clone + Eq + Hash + Send + Sync {
    /// The structural kind of this type.
    fn kind(&self) -> TypeKind;

    /// Whether further subtypes of this type can exist at runtime.
    ///
    /// Only meaningful for [`TypeKind::Class`]; other kinds may return any value.
    fn is_sealed(&self) -> bool;

    /// Whether this descriptor is an unbound generic template (has free type parameters).
    fn is_generic_template(&self) -> bool;

    /// The originating template, if this descriptor is a generic instantiation.
    fn generic_template(&self) -> Option<Self>;

    /// The ordered list of declared instance fields.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if the introspection source
    /// cannot describe this type's fields.
    fn fields(&self) -> Result<Vec<DeclaredField<Self>>>;

    /// A human readable name for diagnostics.
    fn fullname(&self) -> String;
}

/// A smart reference to a [`TypeDesc`] that automatically handles weak references
/// to prevent circular reference memory leaks while providing a clean API.
///
/// Field descriptors hold their field type through this handle: two aggregates
/// that reference each other as fields would otherwise keep each other alive
/// forever. The owning [`crate::typesystem::TypeRegistry`] holds the strong
/// references, so upgrades succeed for as long as the registry exists.
#[derive(Clone, Debug)]
pub struct TypeDescRef {
    weak_ref: Weak<TypeDesc>,
}

impl TypeDescRef {
    /// Create a new `TypeDescRef` from a strong reference
    pub fn new(strong_ref: &TypeDescRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the descriptor, returning None if it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeDescRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced descriptor is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the token of the referenced descriptor (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }

    /// Get the full name of the referenced descriptor (if still alive)
    #[must_use]
    pub fn fullname(&self) -> Option<String> {
        self.upgrade().map(|t| t.fullname())
    }
}

impl From<TypeDescRc> for TypeDescRef {
    fn from(strong_ref: TypeDescRc) -> Self {
        Self::new(&strong_ref)
    }
}

/// A declared instance field of a [`TypeDesc`].
#[derive(Debug, Clone)]
pub struct FieldDesc {
    /// Field name
    pub name: String,
    /// Declared field type (weak, see [`TypeDescRef`])
    pub ty: TypeDescRef,
    /// Field cannot be reassigned after construction (read-only / final)
    pub read_only: bool,
}

impl FieldDesc {
    /// Create a new field description referencing `ty` weakly.
    ///
    /// ## Arguments
    /// * 'name'        - Field name
    /// * 'ty'          - Declared field type
    /// * 'read_only'   - Whether the field is read-only
    pub fn new(name: &str, ty: &TypeDescRc, read_only: bool) -> Self {
        FieldDesc {
            name: name.to_string(),
            ty: TypeDescRef::new(ty),
            read_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesystem::TypeDesc;

    fn sample_type() -> TypeDescRc {
        Arc::new(TypeDesc::new(
            Token::new(0x02000001),
            TypeKind::Class,
            "System".to_string(),
            "Sample".to_string(),
            true,
            None,
        ))
    }

    #[test]
    fn test_type_desc_ref_upgrade() {
        let ty = sample_type();
        let weak = TypeDescRef::new(&ty);

        assert!(weak.is_valid());
        assert_eq!(weak.token(), Some(Token::new(0x02000001)));
        assert_eq!(weak.fullname(), Some("System.Sample".to_string()));

        let upgraded = weak.upgrade().unwrap();
        assert_eq!(upgraded.token, ty.token);
    }

    #[test]
    fn test_type_desc_ref_dangling() {
        let weak = {
            let ty = sample_type();
            TypeDescRef::new(&ty)
        };

        assert!(!weak.is_valid());
        assert!(weak.upgrade().is_none());
        assert_eq!(weak.token(), None);
    }

    #[test]
    fn test_field_desc_new() {
        let ty = sample_type();
        let field = FieldDesc::new("value", &ty, true);

        assert_eq!(field.name, "value");
        assert!(field.read_only);
        assert_eq!(field.ty.token(), Some(ty.token));
    }

    #[test]
    fn test_type_kind_equality() {
        assert_eq!(TypeKind::Class, TypeKind::Class);
        assert_ne!(TypeKind::Class, TypeKind::ValueType);
        assert_ne!(TypeKind::Interface, TypeKind::Delegate);
    }
}
