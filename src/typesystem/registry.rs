//! Central registry for type descriptors.
//!
//! This module provides the [`TypeRegistry`], a thread-safe store for every
//! [`TypeDesc`] an embedder creates. It owns the strong references behind the
//! weak field links, hands out descriptor tokens, interns constructed types
//! (arrays, generic instantiations) and seeds itself with the [`WellKnown`]
//! table at construction.
//!
//! # Registry Architecture
//!
//! - **Token-based lookup**: Primary index keyed by [`Token`]
//! - **Name-based lookup**: Secondary index keyed by full name
//! - **Interning**: Arrays and generic instantiations are created once per
//!   structural identity and shared afterwards
//!
//! # Thread Safety
//!
//! - Lock-free primary storage (`SkipMap`)
//! - Concurrent hash map for the name index (`DashMap`)
//! - Atomic token generation
//!
//! # Examples
//!
//! ```rust
//! use mutscope::typesystem::{TypeRegistry, WellKnown};
//!
//! let registry = TypeRegistry::new();
//!
//! let boolean = registry.well_known(WellKnown::Boolean)?;
//! assert_eq!(boolean.fullname(), "System.Boolean");
//!
//! let array = registry.array_of(&boolean)?;
//! assert_eq!(array.fullname(), "System.Boolean[]");
//!
//! // Interned: asking again yields the same descriptor.
//! assert_eq!(registry.array_of(&boolean)?.token, array.token);
//! # Ok::<(), mutscope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};
use strum::IntoEnumIterator;

use crate::{
    typesystem::{
        FieldDesc, MutabilityClassifier, Token, TypeDesc, TypeDescRc, TypeIntrospect, TypeKind,
        WellKnown, SPACE_REGISTRY,
    },
    Error::{TypeInsert, TypeNotFound},
    Result,
};

/// Thread-safe store of all type descriptors known to an embedder.
///
/// The registry is the owner of descriptor lifetimes: field links between
/// descriptors are weak (see [`crate::typesystem::TypeDescRef`]), so a type
/// remains introspectable exactly as long as the registry that holds it is
/// alive. Each registry is an isolated universe; descriptors from different
/// registries never share tokens or interned constructed types.
#[derive(Debug)]
pub struct TypeRegistry {
    /// Primary storage, keyed by token
    types: SkipMap<Token, TypeDescRc>,
    /// Secondary index, full name to token
    fullnames: DashMap<String, Token>,
    /// Next row index in the registry descriptor space
    next_row: AtomicU32,
}

impl TypeRegistry {
    /// Create a new registry, pre-seeded with every [`WellKnown`] descriptor.
    #[must_use]
    pub fn new() -> Self {
        let registry = TypeRegistry {
            types: SkipMap::new(),
            fullnames: DashMap::new(),
            next_row: AtomicU32::new(1),
        };

        for wk in WellKnown::iter() {
            let desc = Arc::new(TypeDesc::new(
                wk.token(),
                wk.kind(),
                wk.namespace().to_string(),
                wk.name().to_string(),
                wk.is_sealed(),
                None,
            ));

            // The nullable wrapper is the one well-known template; give it
            // its unbound parameter so it reports as a generic template.
            if wk == WellKnown::Nullable {
                let param = Arc::new(TypeDesc::new(
                    registry.next_token(),
                    TypeKind::GenericParam,
                    String::new(),
                    "T".to_string(),
                    true,
                    None,
                ));
                desc.generic_params.push(param);
            }

            registry.types.insert(desc.token, desc.clone());
            registry.fullnames.insert(desc.fullname(), desc.token);
        }

        registry
    }

    /// Allocate a fresh token in the registry descriptor space.
    pub fn next_token(&self) -> Token {
        let row = self.next_row.fetch_add(1, Ordering::Relaxed);
        Token::new(u32::from(SPACE_REGISTRY) << 24 | row)
    }

    /// Look up a descriptor by token.
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<TypeDescRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a descriptor by its full name (Namespace.Name).
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<TypeDescRc> {
        let token = *self.fullnames.get(fullname)?;
        self.get(&token)
    }

    /// Get the descriptor for a well-known type.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the descriptor is missing,
    /// which cannot happen for a registry created through [`TypeRegistry::new`].
    pub fn well_known(&self, wk: WellKnown) -> Result<TypeDescRc> {
        self.get(&wk.token()).ok_or(TypeNotFound(wk.token()))
    }

    /// Register a descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if the token is already taken.
    pub fn insert(&self, desc: &TypeDescRc) -> Result<()> {
        if self.types.contains_key(&desc.token) {
            return Err(TypeInsert(desc.token));
        }

        self.types.insert(desc.token, desc.clone());
        self.fullnames.insert(desc.fullname(), desc.token);
        Ok(())
    }

    /// Get or create the array descriptor over `element`.
    ///
    /// Array descriptors are interned by element type: asking twice for the
    /// same element yields the same descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if an interned entry's backing
    /// descriptor has been removed, which cannot happen through this API.
    pub fn array_of(&self, element: &TypeDescRc) -> Result<TypeDescRc> {
        let display = format!("{}[]", element.fullname());
        if let Some(existing) = self.get_by_fullname(&display) {
            return Ok(existing);
        }

        let desc = Arc::new(TypeDesc::new(
            self.next_token(),
            TypeKind::Array,
            element.namespace.clone(),
            format!("{}[]", element.name),
            true,
            None,
        ));

        self.intern(display, desc)
    }

    /// Get or create the instantiation of `template` with the given arguments.
    ///
    /// The instantiation inherits the template's kind, sealedness and fields;
    /// fields whose declared type is one of the template's own unbound
    /// parameters are substituted with the corresponding argument. The
    /// substitution is first-order: composite field types that merely mention
    /// a parameter (such as an array of `T`) keep their template shape.
    /// Instantiations are interned by template and argument identity.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if `template` is not a
    /// generic template or the argument count does not match its arity.
    pub fn instantiate(&self, template: &TypeDescRc, args: &[TypeDescRc]) -> Result<TypeDescRc> {
        if !template.is_generic_template() {
            return Err(invalid_descriptor!(
                "'{}' is not a generic template",
                template.fullname()
            ));
        }

        let arity = template.generic_params.count();
        if args.len() != arity {
            return Err(invalid_descriptor!(
                "'{}' expects {} type argument(s), got {}",
                template.fullname(),
                arity,
                args.len()
            ));
        }

        let arg_names: Vec<String> = args.iter().map(|arg| arg.fullname()).collect();
        let name = format!("{}<{}>", template.name, arg_names.join(", "));
        let display = if template.namespace.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", template.namespace, name)
        };

        // Consult the intern index before allocating a token, so repeated
        // instantiations do not burn row indices.
        if let Some(existing) = self.get_by_fullname(&display) {
            return Ok(existing);
        }

        let desc = Arc::new(TypeDesc::new(
            self.next_token(),
            template.kind,
            template.namespace.clone(),
            name,
            template.sealed,
            Some(template.clone()),
        ));

        for arg in args {
            desc.generic_args.push(arg.clone());
        }

        for (_, field) in template.fields.iter() {
            let Some(field_type) = field.ty.upgrade() else {
                return Err(invalid_descriptor!(
                    "field '{}' of template '{}' refers to a dropped type descriptor",
                    field.name,
                    template.fullname()
                ));
            };

            let substituted = match template
                .generic_params
                .iter()
                .find(|(_, param)| param.token == field_type.token)
            {
                Some((index, _)) => args.get(index).cloned().ok_or_else(|| {
                    invalid_descriptor!(
                        "parameter index {} out of range for '{}'",
                        index,
                        template.fullname()
                    )
                })?,
                None => field_type,
            };

            desc.fields
                .push(FieldDesc::new(&field.name, &substituted, field.read_only));
        }

        self.intern(display, desc)
    }

    /// All descriptors currently in the registry.
    #[must_use]
    pub fn all(&self) -> Vec<TypeDescRc> {
        self.types
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of registered descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry holds no descriptors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Store a constructed descriptor under its display name, racing fairly:
    /// if another thread interned the same name first, theirs wins.
    fn intern(&self, display: String, desc: TypeDescRc) -> Result<TypeDescRc> {
        match self.fullnames.entry(display) {
            Entry::Occupied(entry) => {
                let token = *entry.get();
                self.get(&token).ok_or(TypeNotFound(token))
            }
            Entry::Vacant(entry) => {
                entry.insert(desc.token);
                self.types.insert(desc.token, desc.clone());
                Ok(desc)
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MutabilityClassifier<TypeDescRc> {
    /// Create a classifier pre-seeded with the [`WellKnown`] mutability table
    /// of the given registry.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the registry is missing a
    /// well-known descriptor, which cannot happen for a registry created
    /// through [`TypeRegistry::new`].
    pub fn for_registry(registry: &TypeRegistry) -> Result<Self> {
        let classifier = Self::new();
        for wk in WellKnown::iter() {
            classifier.register(registry.well_known(wk)?, wk.mutability());
        }
        Ok(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn test_new_registry_is_seeded() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), WellKnown::COUNT);

        for wk in WellKnown::iter() {
            let desc = registry.well_known(wk).unwrap();
            assert_eq!(desc.token, wk.token());
            assert_eq!(desc.kind, wk.kind());
        }
    }

    #[test]
    fn test_fullname_lookup() {
        let registry = TypeRegistry::new();

        let via_name = registry.get_by_fullname("System.Int32").unwrap();
        assert_eq!(via_name.token, WellKnown::I4.token());

        assert!(registry.get_by_fullname("System.Missing").is_none());
    }

    #[test]
    fn test_nullable_is_a_template() {
        let registry = TypeRegistry::new();
        let nullable = registry.well_known(WellKnown::Nullable).unwrap();

        assert!(nullable.is_generic_template());
        assert_eq!(nullable.generic_params.count(), 1);
    }

    #[test]
    fn test_insert_rejects_duplicate_token() {
        let registry = TypeRegistry::new();
        let token = registry.next_token();

        let first: TypeDescRc = Arc::new(TypeDesc::new(
            token,
            TypeKind::Class,
            "Test".to_string(),
            "First".to_string(),
            true,
            None,
        ));
        let second: TypeDescRc = Arc::new(TypeDesc::new(
            token,
            TypeKind::Class,
            "Test".to_string(),
            "Second".to_string(),
            true,
            None,
        ));

        registry.insert(&first).unwrap();
        assert!(matches!(
            registry.insert(&second),
            Err(crate::Error::TypeInsert(t)) if t == token
        ));
    }

    #[test]
    fn test_array_interning() {
        let registry = TypeRegistry::new();
        let byte = registry.well_known(WellKnown::U1).unwrap();

        let first = registry.array_of(&byte).unwrap();
        let second = registry.array_of(&byte).unwrap();

        assert_eq!(first.token, second.token);
        assert_eq!(first.kind, TypeKind::Array);
        assert_eq!(first.fullname(), "System.Byte[]");
    }

    #[test]
    fn test_instantiate_hit_allocates_no_token() {
        let registry = TypeRegistry::new();
        let nullable = registry.well_known(WellKnown::Nullable).unwrap();
        let boolean = registry.well_known(WellKnown::Boolean).unwrap();

        registry.instantiate(&nullable, &[boolean.clone()]).unwrap();

        let before = registry.next_token();
        registry.instantiate(&nullable, &[boolean.clone()]).unwrap();
        let after = registry.next_token();

        // Only the two next_token calls consumed rows; the interned hit did not.
        assert_eq!(after.row(), before.row() + 1);
    }

    #[test]
    fn test_instantiate_checks_arity() {
        let registry = TypeRegistry::new();
        let nullable = registry.well_known(WellKnown::Nullable).unwrap();
        let boolean = registry.well_known(WellKnown::Boolean).unwrap();

        let err = registry.instantiate(&nullable, &[]).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDescriptor { .. }));

        let err = registry
            .instantiate(&nullable, &[boolean.clone(), boolean.clone()])
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_instantiate_rejects_non_template() {
        let registry = TypeRegistry::new();
        let boolean = registry.well_known(WellKnown::Boolean).unwrap();
        let int32 = registry.well_known(WellKnown::I4).unwrap();

        let err = registry.instantiate(&boolean, &[int32]).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_instantiate_interns_and_substitutes() {
        let registry = TypeRegistry::new();
        let nullable = registry.well_known(WellKnown::Nullable).unwrap();
        let boolean = registry.well_known(WellKnown::Boolean).unwrap();

        // Give the template a parameter-typed field to substitute.
        let param = nullable.generic_params.get(0).unwrap().clone();
        nullable.fields.push(FieldDesc::new("value", &param, false));

        let first = registry.instantiate(&nullable, &[boolean.clone()]).unwrap();
        let second = registry.instantiate(&nullable, &[boolean.clone()]).unwrap();

        assert_eq!(first.token, second.token);
        assert_eq!(first.fullname(), "System.Nullable`1<System.Boolean>");
        assert!(!first.is_generic_template());
        assert_eq!(first.generic_template().map(|t| t.token), Some(nullable.token));

        let fields = first.fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].ty.token, boolean.token);
    }
}
