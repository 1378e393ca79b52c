// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # mutscope
//!
//! A thread-safe engine for classifying the structural mutability of runtime type
//! descriptors. `mutscope` answers one question about any type a host runtime can
//! describe: can instances of this type ever be observed changing after
//! construction, and is its concrete runtime behavior still open to extension?
//!
//! ## Features
//!
//! - **🔍 Structural classification** - Walks fields, sealedness and generic
//!   structure; no allow/deny lists of type names
//! - **⚡ Memoized answers** - Every descriptor is analyzed at most once per
//!   classifier, even under concurrent first-time queries
//! - **🛡️ Cycle safe** - Self-referential and mutually recursive type graphs
//!   terminate with a conservative answer
//! - **🔧 Pluggable introspection** - Classify anything that implements
//!   [`typesystem::TypeIntrospect`]; a full descriptor registry is included
//! - **📊 Batch friendly** - Parallel classification of descriptor sets with a
//!   single shared memo table
//!
//! ## Quick Start
//!
//! Add `mutscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mutscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use mutscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let classifier = MutabilityClassifier::for_registry(&registry)?;
//!
//! let boolean = registry.well_known(WellKnown::Boolean)?;
//! assert_eq!(classifier.classify(&boolean)?, MutabilityFlags::IMMUTABLE);
//! # Ok::<(), mutscope::Error>(())
//! ```
//!
//! ### Modeling Types
//!
//! Descriptors are built fluently and registered as they are built:
//!
//! ```rust
//! use mutscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let classifier = MutabilityClassifier::for_registry(&registry)?;
//!
//! let bytes = registry.array_of(&registry.well_known(WellKnown::U1)?)?;
//! let buffer = TypeBuilder::new(registry.clone())
//!     .class("Io", "Buffer")?
//!     .sealed(true)
//!     .field("data", &bytes)
//!     .build()?;
//!
//! // The backing array is reassignable, so the aggregate is writable.
//! assert_eq!(classifier.classify(&buffer)?, MutabilityFlags::WRITABLE);
//! # Ok::<(), mutscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `mutscope` is organized into a small number of modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`typesystem`] - Descriptor model, registry, memo table and the classifier
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ### Classification Model
//!
//! The answer for a type is a [`typesystem::MutabilityFlags`] bitmask. The
//! empty set means immutable. Three independent bits can be added to it:
//!
//! - **Writable** - some field reachable through declared state can be
//!   reassigned after construction
//! - **Open type** - a runtime instance might belong to an unseen subtype, so
//!   the descriptor alone does not pin down runtime behavior
//! - **Open generic** - the descriptor is an unbound template rather than a
//!   concrete type
//!
//! Classification is a union over everything reachable via declared fields,
//! with the type's own kind, sealedness and generic relationship deciding the
//! local contribution. Generic instantiations reuse their template's analysis
//! and substitute the bound arguments.
//!
//! ### Concurrency
//!
//! Every public entry point is safe to call from any number of threads. The
//! memo table guarantees that concurrent first-time queries for the same
//! descriptor run the structural walk exactly once; all other callers park
//! until the answer is published.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) with specific error
//! information:
//!
//! ```rust
//! use mutscope::{Error, typesystem::{TypeRegistry, WellKnown}};
//!
//! let registry = TypeRegistry::new();
//! match registry.well_known(WellKnown::String) {
//!     Ok(desc) => println!("descriptor: {}", desc.fullname()),
//!     Err(Error::TypeNotFound(token)) => println!("missing: {}", token),
//!     Err(e) => println!("error: {}", e),
//! }
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the mutscope library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use mutscope::prelude::*;
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new());
/// let classifier = MutabilityClassifier::for_registry(&registry)?;
/// # Ok::<(), mutscope::Error>(())
/// ```
pub mod prelude;

/// Descriptor model, registry and mutability classification
///
/// This module contains everything needed to model runtime types and classify
/// their structural mutability.
///
/// # Key Components
///
/// ## Descriptor Model
/// - [`typesystem::TypeDesc`] - A single runtime type descriptor
/// - [`typesystem::TypeIntrospect`] - The introspection seam the classifier
///   operates through
/// - [`typesystem::Token`] - Compact descriptor identity
///
/// ## Registry and Construction
/// - [`typesystem::TypeRegistry`] - Concurrent descriptor storage with array
///   and instantiation interning
/// - [`typesystem::TypeBuilder`] - Fluent descriptor construction
/// - [`typesystem::WellKnown`] - Pre-seeded system types
///
/// ## Classification
/// - [`typesystem::MutabilityClassifier`] - The memoized classification service
/// - [`typesystem::MutabilityFlags`] - The classification bitmask
/// - [`typesystem::MemoMap`] - Single-computation-per-key concurrent cache
///
/// # Examples
///
/// ```rust
/// use mutscope::typesystem::{MutabilityClassifier, MutabilityFlags, TypeRegistry, WellKnown};
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new());
/// let classifier = MutabilityClassifier::for_registry(&registry)?;
///
/// let object = registry.well_known(WellKnown::Object)?;
/// assert_eq!(classifier.classify(&object)?, MutabilityFlags::OPEN_TYPE);
/// # Ok::<(), mutscope::Error>(())
/// ```
pub mod typesystem;

/// `mutscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. This is used consistently throughout the crate for all
/// fallible operations.
///
/// # Examples
///
/// ```rust
/// use mutscope::{Result, typesystem::{TypeDescRc, TypeRegistry, WellKnown}};
///
/// fn boolean_descriptor(registry: &TypeRegistry) -> Result<TypeDescRc> {
///     registry.well_known(WellKnown::Boolean)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `mutscope` Error type
///
/// The main error type for all operations in this crate. Provides detailed
/// error information for descriptor introspection, registry maintenance and
/// memoized classification.
///
/// # Examples
///
/// ```rust
/// use mutscope::{Error, typesystem::{Token, TypeRegistry}};
///
/// let registry = TypeRegistry::new();
/// match registry.get(&Token::new(0x0200_FFFF)) {
///     Some(desc) => println!("found: {}", desc.fullname()),
///     None => println!("not registered"),
/// }
/// ```
pub use error::Error;
