use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::TryStreamExt;
use log::{debug, warn};
use rusoto_core::{ByteStream, Region};
use rusoto_s3::{
    AbortMultipartUploadRequest, CompleteMultipartUploadRequest, CompletedMultipartUpload,
    CompletedPart, CreateMultipartUploadRequest, PutObjectRequest, S3Client, UploadPartRequest, S3,
};
use tokio::fs::File as AsyncFile;
use tokio::io::AsyncReadExt;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::cloud::client::{create_s3_client, parse_region};
use crate::config::UploadConfig;
use crate::constants::{
    LARGE_FILE_THRESHOLD, OBJECT_ACL, OBJECT_CONTENT_TYPE, S3_UPLOAD_CHUNK_SIZE,
    STREAMING_BUFFER_SIZE,
};

/// Destination for uploaded files.
///
/// A successful call means the whole object is visible at `key`, replacing
/// whatever was there before. A failed call leaves no partial object.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local_path` to `key`
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<()>;
}

/// Uploads files to a single S3 bucket as public-read octet streams.
///
/// Small files go up in one `PutObject` whose body streams from disk.
/// Files above [`LARGE_FILE_THRESHOLD`] use a multipart upload with parts
/// sent one after another; any part failure aborts the upload.
pub struct S3Uploader {
    bucket: String,
    region: Region,
    client: Arc<S3Client>,
}

impl S3Uploader {
    /// Create an uploader for `bucket` using an existing client
    pub fn new(client: Arc<S3Client>, bucket: &str, region: Region) -> Self {
        S3Uploader {
            bucket: bucket.to_string(),
            region,
            client,
        }
    }

    /// Create an uploader from the run configuration
    pub fn from_config(config: &UploadConfig) -> Result<Self> {
        let region = parse_region(config.region.as_deref());
        let client = create_s3_client(region.clone(), config.profile.as_deref())?;
        Ok(Self::new(client, &config.bucket, region))
    }

    /// Get the bucket objects are written to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the AWS region being used for uploads
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Single-request upload of `size` bytes to `key`
    pub fn put_object_request(&self, key: &str, size: u64, body: ByteStream) -> PutObjectRequest {
        PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            acl: Some(OBJECT_ACL.to_string()),
            content_type: Some(OBJECT_CONTENT_TYPE.to_string()),
            content_length: Some(size as i64),
            body: Some(body),
            ..Default::default()
        }
    }

    /// Start of a multipart upload to `key`; ACL and content type are fixed here
    pub fn create_multipart_request(&self, key: &str) -> CreateMultipartUploadRequest {
        CreateMultipartUploadRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            acl: Some(OBJECT_ACL.to_string()),
            content_type: Some(OBJECT_CONTENT_TYPE.to_string()),
            ..Default::default()
        }
    }

    /// Discard the parts already sent for `upload_id`
    pub fn abort_multipart_request(&self, key: &str, upload_id: &str) -> AbortMultipartUploadRequest {
        AbortMultipartUploadRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            upload_id: upload_id.to_string(),
            ..Default::default()
        }
    }

    async fn upload_small_file(&self, file_path: &Path, key: &str, file_size: u64) -> Result<()> {
        let file = AsyncFile::open(file_path).await
            .context(format!("Failed to open {} for S3 upload", file_path.display()))?;

        let stream = FramedRead::with_capacity(file, BytesCodec::new(), STREAMING_BUFFER_SIZE)
            .map_ok(BytesMut::freeze);

        let request = self.put_object_request(
            key,
            file_size,
            ByteStream::new_with_size(stream, file_size as usize),
        );

        self.client.put_object(request).await
            .map_err(|e| anyhow!("Failed to upload {} to s3://{}/{}: {}",
                                 file_path.display(), self.bucket, key, e))?;
        Ok(())
    }

    async fn upload_large_file(&self, file_path: &Path, key: &str, file_size: u64) -> Result<()> {
        let create_result = self.client.create_multipart_upload(self.create_multipart_request(key))
            .await.context("Failed to initialize multipart upload")?;

        let upload_id = create_result.upload_id
            .ok_or_else(|| anyhow!("No upload ID returned from S3"))?;

        debug!("Started multipart upload with ID: {} for {}", upload_id, file_path.display());

        match self.upload_parts(file_path, key, &upload_id, file_size).await {
            Ok(parts) => {
                let complete_request = CompleteMultipartUploadRequest {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    upload_id: upload_id.clone(),
                    multipart_upload: Some(CompletedMultipartUpload { parts: Some(parts) }),
                    ..Default::default()
                };

                self.client.complete_multipart_upload(complete_request).await
                    .context("Failed to complete multipart upload")?;

                debug!("Completed multipart upload for {}", file_path.display());
                Ok(())
            }
            Err(e) => {
                let abort = self.client
                    .abort_multipart_upload(self.abort_multipart_request(key, &upload_id))
                    .await;

                if let Err(abort_err) = abort {
                    warn!("Failed to abort multipart upload for {}: {}", key, abort_err);
                }

                Err(e.context("Part upload failed, multipart upload aborted"))
            }
        }
    }

    async fn upload_parts(
        &self,
        file_path: &Path,
        key: &str,
        upload_id: &str,
        file_size: u64,
    ) -> Result<Vec<CompletedPart>> {
        let mut file = AsyncFile::open(file_path).await
            .context(format!("Failed to open file for multipart upload: {}", file_path.display()))?;

        let num_parts = part_count(file_size);
        debug!("Uploading {} parts for {}", num_parts, file_path.display());

        let mut completed_parts = Vec::with_capacity(num_parts as usize);

        for part_number in 1..=num_parts {
            let start_byte = (part_number - 1) * S3_UPLOAD_CHUNK_SIZE as u64;
            let end_byte = std::cmp::min(part_number * S3_UPLOAD_CHUNK_SIZE as u64, file_size);

            let mut buffer = vec![0u8; (end_byte - start_byte) as usize];
            file.read_exact(&mut buffer).await
                .context(format!("Failed to read part {} of {}", part_number, file_path.display()))?;

            let output = self.client.upload_part(UploadPartRequest {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                upload_id: upload_id.to_string(),
                part_number: part_number as i64,
                content_length: Some(buffer.len() as i64),
                body: Some(ByteStream::from(buffer)),
                ..Default::default()
            }).await
                .map_err(|e| anyhow!("Failed to upload part {}: {}", part_number, e))?;

            let e_tag = output.e_tag
                .ok_or_else(|| anyhow!("No ETag in upload part response"))?;

            completed_parts.push(CompletedPart {
                e_tag: Some(e_tag),
                part_number: Some(part_number as i64),
            });
        }

        Ok(completed_parts)
    }
}

#[async_trait]
impl ObjectStore for S3Uploader {
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<()> {
        let metadata = tokio::fs::metadata(local_path).await
            .context(format!("Failed to get metadata for {}", local_path.display()))?;
        let file_size = metadata.len();

        debug!("Uploading {} ({} bytes) to s3://{}/{}",
               local_path.display(), file_size, self.bucket, key);

        let start_time = Instant::now();

        if file_size > LARGE_FILE_THRESHOLD {
            self.upload_large_file(local_path, key, file_size).await?;
        } else {
            self.upload_small_file(local_path, key, file_size).await?;
        }

        debug!("Uploaded {} to s3://{}/{} in {:?} (region {})",
               local_path.display(), self.bucket, key, start_time.elapsed(), self.region.name());
        Ok(())
    }
}

/// Number of multipart parts needed for a file of `file_size` bytes
pub fn part_count(file_size: u64) -> u64 {
    let chunk = S3_UPLOAD_CHUNK_SIZE as u64;
    std::cmp::max(1, (file_size + chunk - 1) / chunk)
}
