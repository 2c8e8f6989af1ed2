use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::info;

use crate::error::UploadError;

/// Trait for writing objects to a flat key/value store.
///
/// Keys are forward-slash paths relative to the store root. Implementations
/// must be thread-safe.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any existing object.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<(), UploadError>;

    /// Get a unique identifier for this store (for logging).
    ///
    /// For S3, this would typically be `s3://bucket`.
    fn identifier(&self) -> &str;
}

/// S3-backed implementation of ObjectStore.
///
/// Writes objects into one bucket of S3 or an S3-compatible service (MinIO,
/// etc.).
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    identifier: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String) -> Self {
        let identifier = format!("s3://{}", bucket);
        Self {
            client,
            bucket,
            identifier,
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Make sure the bucket exists, creating it when `create` is set.
    ///
    /// # Errors
    ///
    /// - [`UploadError::NotFound`] if the bucket is missing and `create` is false
    /// - [`UploadError::S3`] / [`UploadError::Connection`] on request failure
    pub async fn ensure_bucket(&self, create: bool) -> Result<(), UploadError> {
        let head = self.client.head_bucket().bucket(&self.bucket).send().await;

        let err = match head {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };

        let is_not_found = err
            .as_service_error()
            .map(|se| se.is_not_found())
            .unwrap_or(false)
            || err
                .raw_response()
                .map(|r| r.status().as_u16() == 404)
                .unwrap_or(false);

        if !is_not_found {
            return Err(map_sdk_error(err));
        }
        if !create {
            return Err(UploadError::NotFound(self.identifier.clone()));
        }

        let mut request = self.client.create_bucket().bucket(&self.bucket);

        // us-east-1 is the one region that rejects an explicit constraint
        let region = self.client.config().region().map(|r| r.as_ref().to_string());
        if let Some(region) = region.filter(|r| r != "us-east-1") {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region.as_str()))
                    .build(),
            );
        }

        request.send().await.map_err(map_sdk_error)?;
        info!("Created bucket {}", self.identifier);

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), UploadError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Split transport failures from service-side errors.
fn map_sdk_error<E, R>(err: SdkError<E, R>) -> UploadError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            UploadError::Connection(aws_sdk_s3::error::DisplayErrorContext(&err).to_string())
        }
        _ => UploadError::S3(aws_sdk_s3::error::DisplayErrorContext(&err).to_string()),
    }
}

/// Build the client `publish` uploads through.
///
/// Passing `--s3-endpoint` (a MinIO server, say) switches to path-style
/// addressing; without it the regular AWS endpoint for `region` is used.
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);
    let sdk_config = match endpoint_url {
        Some(endpoint) => loader.endpoint_url(endpoint).load().await,
        None => loader.load().await,
    };

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(endpoint_url.is_some())
        .build();
    Client::from_conf(s3_config)
}
