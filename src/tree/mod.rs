//! Tree store for dbdrive.
//!
//! Records of a virtual filesystem kept in one flat relation. Every record
//! stores its absolute path, so a subtree is the set of records sharing a
//! path prefix and needs no recursive query.

mod record;
mod repository;

pub use record::{
    descendant_prefix, join_path, normalize_path, validate_name, FileKind, FileRecord,
    InvalidFileKind, NewRecord, ROOT_PATH, SEPARATOR,
};
pub use repository::TreeRepository;
