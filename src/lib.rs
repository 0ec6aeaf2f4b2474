//! Clasp (Convenience Layer for Abstract Statement Parameters).
//!
//! A convenience layer between application code and a row/column oriented
//! database access API: callers supply named parameters and structured host
//! values instead of positional placeholders and driver native containers,
//! and receive structured values back instead of raw cursor rows.
//!
//! The crate covers four pieces:
//! - [`ParameterStore`]: an ordered named parameter container.
//! - [`ProcessedTemplate`]: a `:name` / `#{name,...}` template tokenizer
//!   producing positional marker SQL plus ordered parameter metadata.
//! - [`Coercion`] with [`ConvertingPipeline`] and [`PassthroughPipeline`]:
//!   the three phase value coercion protocol around a statement execution.
//! - [`LazyCursor`]: a bounded cache view over an open, possibly large,
//!   cursor.
//!
//! Backends plug in through the capability traits [`Connection`] and
//! [`DriverCursor`] together with the container traits [`DriverLob`] and
//! [`DriverArray`].

pub use clasp_core::*;
