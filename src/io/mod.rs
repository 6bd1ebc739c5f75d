//! Input/output helpers.
//!
//! - exchange file (model header + samples) read/write (`exchange`)
//! - path file ingest (`trajectory`)
//! - run summary JSON read/write (`summary`)

pub mod exchange;
pub mod summary;
pub mod trajectory;

pub use exchange::*;
pub use summary::*;
pub use trajectory::*;
