//! GraphQL schema analysis: building schemas from SDL and finding the
//! breaking changes between two versions of a file.

pub mod diff;
pub mod engine;
pub mod model;

pub use diff::{BreakingChange, ChangeType, find_breaking_changes};
pub use engine::{DecodeError, SchemaFileResult, Verdict, compare, decode_content};
pub use model::{Schema, SchemaBuildError};
