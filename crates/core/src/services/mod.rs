//! Pagination services: cursor codec, argument validation and the
//! connection loader.

pub mod cursor;
mod connection;
mod validator;

pub use connection::{ConnectionLoader, LoaderConfig};
pub use cursor::DecodedCursor;
pub use validator::validate;
