mod diagnostics;
mod pagination;
mod record;
mod source;

#[cfg(test)]
pub(crate) use diagnostics::testing;

pub use diagnostics::*;
pub use pagination::*;
pub use record::*;
pub use source::*;
