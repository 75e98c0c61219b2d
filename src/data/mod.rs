//! Data structures for persistence: ordered field archives and the
//! run-time type registry.

pub use self::archive::{Archive, ArchiveError, ArchiveIn, ArchiveOut, ArchiveValue};
pub use self::registry::{instantiate, is_registered, register, register_default_types};

mod archive;
mod registry;
