//! Store schema, models, and the read-only query surface

pub mod init;
pub mod models;
pub mod query;

pub use init::*;
pub use models::*;
pub use query::*;
