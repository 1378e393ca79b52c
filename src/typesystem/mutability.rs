//! Structural mutability classification.
//!
//! This module answers, for any type descriptor, a conservative structural
//! question: can instances of this type ever be observed changing after
//! construction, and is the type's concrete runtime behavior still open to
//! extension? The answer is a [`MutabilityFlags`] bitmask computed by walking
//! the type's declared shape (fields, generic arguments, sealedness) and
//! recursively classifying every referenced type.
//!
//! Mutability is a union over everything reachable via declared state: a
//! value type containing a writable class field is itself writable, because
//! aliasing through that field lets the aggregate's observable state change.
//! A type is open if a runtime instance might belong to a more specific
//! subtype the classifier has not seen, since that unseen subtype could be
//! writable even when the declared type looks closed.
//!
//! # Key Components
//!
//! - [`MutabilityFlags`]: The four-way classification bitmask
//! - [`MutabilityClassifier`]: Memoized classification service over any
//!   [`TypeIntrospect`] implementation
//!
//! # Thread Safety
//!
//! A classifier instance can be shared freely across threads. All state lives
//! in a [`MemoMap`], so concurrent first-time queries for the same descriptor
//! run the structural analysis exactly once.
//!
//! # Examples
//!
//! ```rust
//! use mutscope::typesystem::{
//!     MutabilityClassifier, MutabilityFlags, TypeBuilder, TypeRegistry, WellKnown,
//! };
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let classifier = MutabilityClassifier::for_registry(&registry)?;
//!
//! let int32 = registry.well_known(WellKnown::I4)?;
//! let pair = TypeBuilder::new(registry.clone())
//!     .class("Demo", "Pair")?
//!     .sealed(true)
//!     .readonly_field("first", &int32)
//!     .readonly_field("second", &int32)
//!     .build()?;
//!
//! assert_eq!(classifier.classify(&pair)?, MutabilityFlags::IMMUTABLE);
//! # Ok::<(), mutscope::Error>(())
//! ```

use std::collections::HashSet;

use bitflags::bitflags;

use crate::{
    typesystem::{MemoMap, TypeIntrospect, TypeKind},
    Result,
};

bitflags! {
    /// The mutability classification of a type, as a combinable bitmask.
    ///
    /// The empty set ([`MutabilityFlags::IMMUTABLE`]) means instances never
    /// change observable state after construction and the type's runtime
    /// behavior is fully known. The three bits are independent and additive;
    /// `WRITABLE | OPEN_TYPE` is a perfectly ordinary result.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MutabilityFlags: u8 {
        /// At least one instance field reachable through declared state can be
        /// reassigned after construction
        const WRITABLE = 0x01;
        /// The concrete runtime shape is not fully determined by the descriptor
        /// alone; a runtime instance might be a more specific subtype
        const OPEN_TYPE = 0x02;
        /// The descriptor itself is an unbound generic template rather than a
        /// concrete, queryable type
        const OPEN_GENERIC = 0x04;
    }
}

impl MutabilityFlags {
    /// The empty flag set: fully known, never mutated after construction
    pub const IMMUTABLE: MutabilityFlags = MutabilityFlags::empty();

    /// Conservative result assigned to a type that participates in a cyclic
    /// field graph and is re-entered before its own classification finishes
    pub const CYCLE_FALLBACK: MutabilityFlags =
        MutabilityFlags::WRITABLE.union(MutabilityFlags::OPEN_TYPE);

    /// Whether this is the fully immutable classification
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.is_empty()
    }
}

/// Memoized structural mutability classification over type descriptors.
///
/// Each classifier owns its own [`MemoMap`]; there is no process-global state,
/// so tests (and embedders that want isolation) can instantiate independent
/// classifiers with independent caches. For shared use, wrap the classifier in
/// an `Arc` and hand it to every caller.
///
/// # Base cases
///
/// Checked before structural recursion, in priority order: a registered table
/// entry, then the descriptor kind (primitive, interface, array, delegate,
/// enum, generic parameter). Everything else is an aggregate and gets the
/// full structural walk.
pub struct MutabilityClassifier<D: TypeIntrospect> {
    table: MemoMap<D, MutabilityFlags>,
}

impl<D: TypeIntrospect> MutabilityClassifier<D> {
    /// Create a classifier with an empty table (no pre-seeded entries)
    #[must_use]
    pub fn new() -> Self {
        MutabilityClassifier {
            table: MemoMap::new(),
        }
    }

    /// Create a classifier pre-seeded from an iterator of known answers.
    ///
    /// ## Arguments
    /// * 'seeds' - `(descriptor, flags)` pairs stored before any query runs
    pub fn with_seeds<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = (D, MutabilityFlags)>,
    {
        let classifier = Self::new();
        for (descriptor, flags) in seeds {
            classifier.register(descriptor, flags);
        }
        classifier
    }

    /// Classify a type descriptor, computing and caching the result on first access.
    ///
    /// Repeated calls for the same descriptor are O(1) and return the identical
    /// flag set. Concurrent first-time calls for the same descriptor run the
    /// structural analysis exactly once. Cyclic field graphs terminate: when
    /// the walk re-enters a type whose classification is still in progress,
    /// that re-entrant query resolves to [`MutabilityFlags::CYCLE_FALLBACK`].
    /// This holds even when concurrent threads enter the same cycle from
    /// different types; the underlying table breaks cross-thread wait cycles
    /// with the same fallback.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if the introspection source
    /// cannot describe a type encountered during the walk, and
    /// [`crate::Error::ProducerFailure`] if a concurrent classification this
    /// call was waiting on failed.
    pub fn classify(&self, ty: &D) -> Result<MutabilityFlags> {
        self.table
            .get_or_compute(ty, MutabilityFlags::CYCLE_FALLBACK, || {
                self.classify_impl(ty)
            })
    }

    /// Classify an optional descriptor; an absent descriptor is immutable.
    ///
    /// # Errors
    /// Same failure modes as [`MutabilityClassifier::classify`].
    pub fn classify_opt(&self, ty: Option<&D>) -> Result<MutabilityFlags> {
        match ty {
            Some(ty) => self.classify(ty),
            None => Ok(MutabilityFlags::IMMUTABLE),
        }
    }

    /// Unconditionally store `flags` for `ty`, replacing any computed or
    /// registered entry.
    ///
    /// Used to pre-seed known-safe answers for well-known types.
    pub fn register(&self, ty: D, flags: MutabilityFlags) {
        self.table.insert(ty, flags);
    }

    /// Store `flags` for `ty` only if no entry exists yet, and return whatever
    /// ends up stored, win or lose.
    ///
    /// # Errors
    /// Returns [`crate::Error::ProducerFailure`] if an in-flight classification
    /// for this descriptor fails while being awaited.
    pub fn try_register(&self, ty: D, flags: MutabilityFlags) -> Result<MutabilityFlags> {
        self.table.get_or_insert(ty, flags)
    }

    /// Number of classified (or in-flight) descriptors in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table holds no entries at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Classify every descriptor in `types`, in parallel.
    ///
    /// Results come back in input order. The per-key single-computation
    /// guarantee holds across the whole batch: duplicated descriptors and
    /// shared field types are analyzed once no matter how the work is split
    /// across threads.
    ///
    /// # Errors
    /// Same failure modes as [`MutabilityClassifier::classify`]; the first
    /// error encountered aborts the batch.
    pub fn classify_all(&self, types: &[D]) -> Result<Vec<MutabilityFlags>>
    where
        Self: Sync,
    {
        use rayon::prelude::*;

        types.par_iter().map(|ty| self.classify(ty)).collect()
    }

    /// The single structural walk; only ever invoked through the memo table.
    fn classify_impl(&self, ty: &D) -> Result<MutabilityFlags> {
        let mut flags = MutabilityFlags::IMMUTABLE;

        let is_class = match ty.kind() {
            TypeKind::Primitive | TypeKind::Delegate | TypeKind::Enum => return Ok(flags),
            TypeKind::Interface | TypeKind::GenericParam => {
                return Ok(MutabilityFlags::OPEN_TYPE)
            }
            TypeKind::Array => return Ok(MutabilityFlags::WRITABLE),
            TypeKind::Class => true,
            TypeKind::ValueType => false,
        };

        if is_class && !ty.is_sealed() {
            flags |= MutabilityFlags::OPEN_TYPE;
        }

        let fields = ty.fields()?;
        if is_class && fields.iter().any(|field| !field.read_only) {
            flags |= MutabilityFlags::WRITABLE;
        }

        let mut field_types: Vec<D> = fields.into_iter().map(|field| field.ty).collect();

        if ty.is_generic_template() {
            // A template's own unbound parameters contribute nothing; the
            // openness they represent is already captured by OPEN_GENERIC.
            field_types.retain(|field_type| field_type.kind() != TypeKind::GenericParam);
            flags |= MutabilityFlags::OPEN_GENERIC;
        } else if let Some(template) = ty.generic_template() {
            // The instantiation reuses the template's structural analysis but
            // is itself closed, so the template's OPEN_GENERIC bit is dropped.
            flags |= self.classify(&template)? - MutabilityFlags::OPEN_GENERIC;
        }

        let mut seen: HashSet<D> = HashSet::with_capacity(field_types.len());
        for field_type in field_types {
            if seen.insert(field_type.clone()) {
                flags |= self.classify(&field_type)?;
            }
        }

        Ok(flags)
    }
}

impl<D: TypeIntrospect> Default for MutabilityClassifier<D> {
    fn default() -> Self {
        Self::new()
    }
}
