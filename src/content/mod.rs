//! Content storage for dbdrive.
//!
//! File bytes live outside the metadata relation as immutable blobs in one
//! flat directory. A write always creates a new blob, so a record is
//! repointed only after its new content is fully on disk.

mod store;

pub use store::{ContentStore, BLOB_PREFIX};
