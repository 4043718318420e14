//! Process-wide logging setup shared by the workspace binaries.

mod tracing;

pub use self::tracing::{init, init_with_level};
