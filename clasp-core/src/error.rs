use thiserror::Error;

/// Fault categories raised by the binding and coercion machinery.
///
/// Every fatal error produced by this crate wraps one of these variants into
/// the crate wide [`Error`](crate::Error), callers can branch on the category
/// with `error.downcast_ref::<Fault>()`. Release failures are the one case
/// that is not represented here: they are logged and swallowed because the
/// statement has already executed by the time release runs.
#[derive(Error, Debug)]
pub enum Fault {
    /// Malformed or ambiguous placeholder text, raised while parsing a
    /// template and aborts the parse.
    #[error("template fault: {0}")]
    Template(String),
    /// The positions of a parameter store do not form a dense 0..N range.
    #[error("ordering fault: {0}")]
    Ordering(String),
    /// A host value has no supported conversion to its declared container
    /// type, or the backend lacks a capability the conversion requires.
    #[error("conversion fault: {0}")]
    Conversion(String),
    /// A scroll or update operation was invoked on a cursor opened without
    /// that capability.
    #[error("capability fault: {0}")]
    Capability(String),
    /// A cached-only operation was asked about a row that is not in the cache.
    #[error("row {0} is outside the cached range")]
    OutOfRange(u64),
    /// The operation is not part of the lazy cursor contract.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// A name expected by a template had no value, or a positional value list
    /// had the wrong length.
    #[error("binding fault: {0}")]
    Binding(String),
}

impl Fault {
    pub fn template(message: impl Into<String>) -> crate::Error {
        Self::Template(message.into()).into()
    }
    pub fn ordering(message: impl Into<String>) -> crate::Error {
        Self::Ordering(message.into()).into()
    }
    pub fn conversion(message: impl Into<String>) -> crate::Error {
        Self::Conversion(message.into()).into()
    }
    pub fn capability(message: impl Into<String>) -> crate::Error {
        Self::Capability(message.into()).into()
    }
    pub fn out_of_range(row: u64) -> crate::Error {
        Self::OutOfRange(row).into()
    }
    pub fn unsupported(message: impl Into<String>) -> crate::Error {
        Self::Unsupported(message.into()).into()
    }
    pub fn binding(message: impl Into<String>) -> crate::Error {
        Self::Binding(message.into()).into()
    }
}
