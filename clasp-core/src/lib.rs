mod as_value;
mod backend;
mod error;
mod lazy;
mod parameter;
mod pipeline;
mod template;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use backend::*;
pub use error::*;
pub use lazy::*;
pub use parameter::*;
pub use pipeline::*;
pub use template::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
