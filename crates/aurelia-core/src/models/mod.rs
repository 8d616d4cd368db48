pub mod media;

pub use media::{
    MediaEntry, MediaLedgerDocument, NewMediaEntry, UploadFileFailure, UploadFileResult,
    UploadResponse, UploadedFile,
};
