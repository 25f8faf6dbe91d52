pub mod error;
pub mod store;

pub use error::StorageError;
pub use store::{AttachmentKind, BlobStore, IncomingFile, UploadLimits, UploadResult};
