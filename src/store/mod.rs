mod blobs;
mod notes;

pub use blobs::{BatchOutcome, BlobStore};
pub(crate) use blobs::blob_token;
pub use notes::NoteStore;
