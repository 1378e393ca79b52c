//! Builder for type descriptors.
//!
//! This module provides the [`TypeBuilder`] struct, which offers a fluent API
//! for constructing type descriptors - classes, value types, interfaces,
//! enums, delegates and generic templates - and registering them in a
//! [`TypeRegistry`]. It is the intended way for embedders and tests to model
//! the types they want classified.
//!
//! # Example
//!
//! ```rust
//! use mutscope::typesystem::{TypeBuilder, TypeRegistry, WellKnown};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let int32 = registry.well_known(WellKnown::I4)?;
//!
//! let point = TypeBuilder::new(registry.clone())
//!     .value_type("Geometry", "Point")?
//!     .readonly_field("x", &int32)
//!     .readonly_field("y", &int32)
//!     .build()?;
//!
//! assert_eq!(point.fullname(), "Geometry.Point");
//! assert_eq!(point.fields.count(), 2);
//! # Ok::<(), mutscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    typesystem::{FieldDesc, TypeDesc, TypeDescRc, TypeKind, TypeRegistry},
    Result,
};

/// The declared type of a field that has not been built yet.
#[derive(Debug)]
enum PendingType {
    /// An already-registered descriptor
    Concrete(TypeDescRc),
    /// The n-th generic parameter of the type under construction
    Param(usize),
}

/// A field recorded by the builder, resolved at build time.
#[derive(Debug)]
struct PendingField {
    name: String,
    ty: PendingType,
    read_only: bool,
}

/// Provides a fluent API for building type descriptors
#[derive(Debug)]
pub struct TypeBuilder {
    /// Type registry the built descriptor is stored in
    registry: Arc<TypeRegistry>,
    /// Structural kind, set by one of the kind starters
    kind: Option<TypeKind>,
    /// Namespace of the type being built
    namespace: String,
    /// Name of the type being built
    name: String,
    /// Whether further subtypes can exist at runtime
    sealed: bool,
    /// Names of the unbound generic parameters, in declaration order
    generic_params: Vec<String>,
    /// Declared instance fields, in declaration order
    fields: Vec<PendingField>,
}

impl TypeBuilder {
    /// Create a new builder with the given registry
    ///
    /// ## Arguments
    /// * 'registry' - The type registry to use
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        TypeBuilder {
            registry,
            kind: None,
            namespace: String::new(),
            name: String::new(),
            sealed: false,
            generic_params: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Start building a reference-aggregate (class) with the given name
    ///
    /// Classes start out non-sealed; use [`TypeBuilder::sealed`] to close them.
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for the type
    /// * 'name'      - Name for the type
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if a kind was already selected.
    pub fn class(self, namespace: &str, name: &str) -> Result<Self> {
        self.start(TypeKind::Class, namespace, name, false)
    }

    /// Start building a value-aggregate (struct) with the given name
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for the type
    /// * 'name'      - Name for the type
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if a kind was already selected.
    pub fn value_type(self, namespace: &str, name: &str) -> Result<Self> {
        self.start(TypeKind::ValueType, namespace, name, true)
    }

    /// Start building an interface with the given name
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for the type
    /// * 'name'      - Name for the type
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if a kind was already selected.
    pub fn interface(self, namespace: &str, name: &str) -> Result<Self> {
        self.start(TypeKind::Interface, namespace, name, false)
    }

    /// Start building an enum with the given name
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for the type
    /// * 'name'      - Name for the type
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if a kind was already selected.
    pub fn enumeration(self, namespace: &str, name: &str) -> Result<Self> {
        self.start(TypeKind::Enum, namespace, name, true)
    }

    /// Start building a delegate with the given name
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for the type
    /// * 'name'      - Name for the type
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if a kind was already selected.
    pub fn delegate(self, namespace: &str, name: &str) -> Result<Self> {
        self.start(TypeKind::Delegate, namespace, name, true)
    }

    /// Set whether further subtypes of the built type can exist at runtime
    ///
    /// ## Arguments
    /// * 'sealed' - The sealed flag to use
    #[must_use]
    pub fn sealed(mut self, sealed: bool) -> Self {
        self.sealed = sealed;
        self
    }

    /// Declare an unbound generic parameter, turning the type into a template
    ///
    /// ## Arguments
    /// * 'name' - Parameter name (e.g. "T")
    #[must_use]
    pub fn generic_param(mut self, name: &str) -> Self {
        self.generic_params.push(name.to_string());
        self
    }

    /// Declare a reassignable instance field
    ///
    /// ## Arguments
    /// * 'name' - Field name
    /// * 'ty'   - Declared field type
    #[must_use]
    pub fn field(mut self, name: &str, ty: &TypeDescRc) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            ty: PendingType::Concrete(ty.clone()),
            read_only: false,
        });
        self
    }

    /// Declare a read-only instance field
    ///
    /// ## Arguments
    /// * 'name' - Field name
    /// * 'ty'   - Declared field type
    #[must_use]
    pub fn readonly_field(mut self, name: &str, ty: &TypeDescRc) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            ty: PendingType::Concrete(ty.clone()),
            read_only: true,
        });
        self
    }

    /// Declare a reassignable field whose type is the n-th generic parameter
    ///
    /// ## Arguments
    /// * 'name'  - Field name
    /// * 'index' - Zero-based generic parameter index
    #[must_use]
    pub fn param_field(mut self, name: &str, index: usize) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            ty: PendingType::Param(index),
            read_only: false,
        });
        self
    }

    /// Declare a read-only field whose type is the n-th generic parameter
    ///
    /// ## Arguments
    /// * 'name'  - Field name
    /// * 'index' - Zero-based generic parameter index
    #[must_use]
    pub fn readonly_param_field(mut self, name: &str, index: usize) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            ty: PendingType::Param(index),
            read_only: true,
        });
        self
    }

    /// Build the descriptor and register it.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidDescriptor`] if no kind starter was
    /// called or a field references a generic parameter index that was never
    /// declared, and [`crate::Error::TypeInsert`] if registration fails.
    pub fn build(self) -> Result<TypeDescRc> {
        let Some(kind) = self.kind else {
            return Err(invalid_descriptor!(
                "no type kind selected for '{}'",
                self.name
            ));
        };

        let desc = Arc::new(TypeDesc::new(
            self.registry.next_token(),
            kind,
            self.namespace,
            self.name,
            self.sealed,
            None,
        ));

        for param_name in &self.generic_params {
            let param = Arc::new(TypeDesc::new(
                self.registry.next_token(),
                TypeKind::GenericParam,
                String::new(),
                param_name.clone(),
                true,
                None,
            ));
            desc.generic_params.push(param);
        }

        for pending in self.fields {
            let field_type = match pending.ty {
                PendingType::Concrete(ty) => ty,
                PendingType::Param(index) => {
                    desc.generic_params.get(index).cloned().ok_or_else(|| {
                        invalid_descriptor!(
                            "field '{}' references generic parameter {} but '{}' declares {}",
                            pending.name,
                            index,
                            desc.name,
                            desc.generic_params.count()
                        )
                    })?
                }
            };

            desc.fields
                .push(FieldDesc::new(&pending.name, &field_type, pending.read_only));
        }

        self.registry.insert(&desc)?;
        Ok(desc)
    }

    /// Record the kind, name and default sealedness of the type being built.
    fn start(mut self, kind: TypeKind, namespace: &str, name: &str, sealed: bool) -> Result<Self> {
        if let Some(existing) = self.kind {
            return Err(invalid_descriptor!(
                "type kind already selected ({:?})",
                existing
            ));
        }

        self.kind = Some(kind);
        self.namespace = namespace.to_string();
        self.name = name.to_string();
        self.sealed = sealed;
        Ok(self)
    }
}
