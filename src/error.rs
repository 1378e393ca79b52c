use thiserror::Error;

use crate::typesystem::Token;

macro_rules! invalid_descriptor {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidDescriptor {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidDescriptor {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes of descriptor introspection, registry maintenance
/// and memoized classification. Each variant provides specific context about the failure
/// mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Introspection Errors
/// - [`Error::InvalidDescriptor`] - The introspection source cannot describe a type
///
/// ## Registry Errors
/// - [`Error::TypeInsert`] - Failed to register a new descriptor in the registry
/// - [`Error::TypeNotFound`] - Requested descriptor not present in the registry
///
/// ## Cache Errors
/// - [`Error::ProducerFailure`] - A memoized computation awaited by this caller failed
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use mutscope::{Error, typesystem::{TypeRegistry, WellKnown}};
///
/// let registry = TypeRegistry::new();
/// match registry.well_known(WellKnown::Boolean) {
///     Ok(desc) => println!("bool descriptor: {}", desc.token),
///     Err(Error::TypeNotFound(token)) => eprintln!("missing descriptor: {}", token),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The introspection source cannot describe the given type.
    ///
    /// This error occurs when a descriptor is malformed or refers to structure
    /// that is no longer available, such as a field whose type descriptor has
    /// been dropped, or a generic instantiation request with the wrong number
    /// of arguments. The error includes the source location where the problem
    /// was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what could not be described
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("InvalidDescriptor - {file}:{line}: {message}")]
    InvalidDescriptor {
        /// The message to be printed for the InvalidDescriptor error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failed to insert a new descriptor into the [`crate::typesystem::TypeRegistry`].
    ///
    /// This error occurs when attempting to register a descriptor whose token
    /// is already taken by a different descriptor.
    ///
    /// The associated [`Token`] identifies which descriptor caused the failure.
    #[error("Failed to insert new descriptor into TypeRegistry - {0}")]
    TypeInsert(Token),

    /// Failed to find a descriptor in the [`crate::typesystem::TypeRegistry`].
    ///
    /// This error occurs when looking up a descriptor by token that doesn't
    /// exist in the registry.
    ///
    /// The associated [`Token`] identifies which descriptor was not found.
    #[error("Failed to find descriptor in TypeRegistry - {0}")]
    TypeNotFound(Token),

    /// A memoized computation this caller was waiting on failed.
    ///
    /// The thread that initiated the computation receives the original error;
    /// every concurrent caller parked on the same cache slot receives this
    /// variant instead, carrying the failure message. The slot itself is
    /// cleared, so a later fresh call for the same key retries the computation.
    #[error("Awaited computation failed - {0}")]
    ProducerFailure(String),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically
    /// when trying to acquire a mutex that was poisoned by a panicking thread.
    #[error("Failed to lock target")]
    LockError,
}
