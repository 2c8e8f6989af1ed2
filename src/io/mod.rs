mod object_store;
mod upload;

pub use object_store::{create_s3_client, ObjectStore, S3ObjectStore};
pub use upload::{
    collect_upload_entries, content_type_for, object_key, upload_directory, UploadEntry,
    UploadSummary,
};
