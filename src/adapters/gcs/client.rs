//! Cloud Storage client

use crate::adapters::auth::{load_credentials, CredentialSource};
use crate::adapters::traits::{BlobStore, StoredObject};
use crate::config::AuthConfig;
use crate::domain::ids::{BucketName, ObjectName};
use crate::domain::{ExporterError, Result, StorageError};
use async_trait::async_trait;
use chrono::DateTime;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::buckets::get::GetBucketRequest;
use google_cloud_storage::http::object_access_controls::get::GetObjectAccessControlRequest;
use google_cloud_storage::http::object_access_controls::insert::{
    InsertObjectAccessControlRequest, ObjectAccessControlCreationConfig,
};
use google_cloud_storage::http::object_access_controls::ObjectACLRole;
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::rewrite::RewriteObjectRequest;
use google_cloud_storage::http::objects::Object;
use google_cloud_storage::http::Error as GcsError;

/// Upper bound on rewrite calls for one rename
///
/// Same-bucket rewrites with the same storage class normally finish in a
/// single call.
const MAX_REWRITE_CALLS: usize = 100;

/// ACL entity granting unauthenticated read access
const PUBLIC_ENTITY: &str = "allUsers";

/// Cloud Storage client
pub struct GcsClient {
    client: Client,
}

impl GcsClient {
    /// Connects a client with the configured credentials
    ///
    /// # Errors
    ///
    /// Returns `ExporterError::Authentication` if no usable credentials are
    /// found
    pub async fn connect(auth: &AuthConfig) -> Result<Self> {
        let source = CredentialSource::from_config(auth);
        let config = match load_credentials(auth).await? {
            Some(credentials) => ClientConfig::default().with_credentials(credentials).await,
            None => ClientConfig::default().with_auth().await,
        }
        .map_err(|e| {
            ExporterError::Authentication(format!("Cloud Storage credentials ({source}): {e}"))
        })?;

        tracing::debug!(credentials = %source, "Cloud Storage client ready");
        Ok(Self {
            client: Client::new(config),
        })
    }

    async fn rewrite(
        &self,
        bucket: &BucketName,
        from: &ObjectName,
        to: &ObjectName,
    ) -> Result<Object> {
        let mut token: Option<String> = None;

        for _ in 0..MAX_REWRITE_CALLS {
            let request = RewriteObjectRequest {
                destination_bucket: bucket.to_string(),
                destination_object: to.to_string(),
                source_bucket: bucket.to_string(),
                source_object: from.to_string(),
                rewrite_token: token.take(),
                ..Default::default()
            };

            let progress = self
                .client
                .rewrite_object(&request)
                .await
                .map_err(|e| rename_error(&e, from, to))?;

            tracing::debug!(
                from = %from,
                to = %to,
                bytes_rewritten = ?progress.total_bytes_rewritten,
                done = progress.done,
                "Rewrite call finished"
            );

            let step = rewrite_progress(
                from,
                progress.done,
                progress.resource,
                progress.rewrite_token,
            )?;
            match step {
                RewriteProgress::Done(object) => return Ok(object),
                RewriteProgress::Continue(next) => token = Some(next),
            }
        }

        Err(StorageError::RenameFailed {
            from: from.to_string(),
            to: to.to_string(),
            message: format!("rewrite did not finish after {MAX_REWRITE_CALLS} calls"),
        }
        .into())
    }
}

#[async_trait]
impl BlobStore for GcsClient {
    async fn get_bucket(&self, bucket: &BucketName) -> Result<()> {
        let request = GetBucketRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        match self.client.get_bucket(&request).await {
            Ok(found) => {
                tracing::debug!(bucket = %found.name, location = %found.location, "Bucket found");
                Ok(())
            }
            Err(e) => Err(match status_code(&e) {
                Some(404) => StorageError::BucketNotFound(bucket.to_string()),
                Some(403) => StorageError::PermissionDenied(format!("bucket {bucket}: {e}")),
                _ => StorageError::Request(format!("Failed to get bucket {bucket}: {e}")),
            }
            .into()),
        }
    }

    async fn rename_object(
        &self,
        bucket: &BucketName,
        from: &ObjectName,
        to: &ObjectName,
    ) -> Result<StoredObject> {
        let object = self.rewrite(bucket, from, to).await?;

        let request = DeleteObjectRequest {
            bucket: bucket.to_string(),
            object: from.to_string(),
            ..Default::default()
        };
        self.client
            .delete_object(&request)
            .await
            .map_err(|e| rename_error(&e, from, to))?;

        tracing::debug!(bucket = %bucket, from = %from, to = %to, "Object renamed");
        Ok(stored_object(&object))
    }

    async fn make_public(&self, bucket: &BucketName, object: &ObjectName) -> Result<()> {
        let request = InsertObjectAccessControlRequest {
            bucket: bucket.to_string(),
            object: object.to_string(),
            generation: None,
            acl: ObjectAccessControlCreationConfig {
                entity: PUBLIC_ENTITY.to_string(),
                role: ObjectACLRole::READER,
            },
        };

        match self.client.insert_object_access_control(&request).await {
            Ok(_) => Ok(()),
            Err(e) => Err(acl_error(status_code(&e), object, e.to_string()).into()),
        }
    }

    async fn object_metadata(
        &self,
        bucket: &BucketName,
        object: &ObjectName,
    ) -> Result<Option<StoredObject>> {
        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            object: object.to_string(),
            ..Default::default()
        };

        match self.client.get_object(&request).await {
            Ok(found) => Ok(Some(stored_object(&found))),
            Err(e) if status_code(&e) == Some(404) => Ok(None),
            Err(e) => Err(StorageError::Request(format!(
                "Failed to get metadata of {object}: {e}"
            ))
            .into()),
        }
    }

    async fn is_public(&self, bucket: &BucketName, object: &ObjectName) -> Result<bool> {
        let request = GetObjectAccessControlRequest {
            bucket: bucket.to_string(),
            entity: PUBLIC_ENTITY.to_string(),
            object: object.to_string(),
            generation: None,
        };

        match self.client.get_object_access_control(&request).await {
            Ok(_) => Ok(true),
            Err(e) if status_code(&e) == Some(404) => Ok(false),
            Err(e) => Err(StorageError::Request(format!(
                "Failed to read ACL of {object}: {e}"
            ))
            .into()),
        }
    }
}

/// Outcome of one rewrite call
#[derive(Debug, PartialEq, Eq)]
enum RewriteProgress<T> {
    /// The copy is complete
    Done(T),

    /// More calls are needed, resuming from this token
    Continue(String),
}

fn rewrite_progress<T>(
    from: &ObjectName,
    done: bool,
    resource: Option<T>,
    token: Option<String>,
) -> std::result::Result<RewriteProgress<T>, StorageError> {
    if done {
        return resource.map(RewriteProgress::Done).ok_or_else(|| {
            StorageError::InvalidResponse(format!(
                "Rewrite of {from} finished without an object resource"
            ))
        });
    }

    match token {
        Some(token) if !token.is_empty() => Ok(RewriteProgress::Continue(token)),
        _ => Err(StorageError::InvalidResponse(format!(
            "Rewrite of {from} is incomplete but returned no rewrite token"
        ))),
    }
}

/// HTTP status of an API error response, `None` for transport failures
fn status_code(error: &GcsError) -> Option<u16> {
    match error {
        GcsError::Response(response) => Some(response.code),
        _ => None,
    }
}

fn rename_error(error: &GcsError, from: &ObjectName, to: &ObjectName) -> StorageError {
    rename_error_for_status(status_code(error), from, to, error.to_string())
}

fn rename_error_for_status(
    status: Option<u16>,
    from: &ObjectName,
    to: &ObjectName,
    message: String,
) -> StorageError {
    match status {
        Some(404) => StorageError::ObjectNotFound(from.to_string()),
        Some(403) => StorageError::PermissionDenied(format!("renaming {from} to {to}: {message}")),
        Some(409) | Some(412) => {
            StorageError::Conflict(format!("renaming {from} to {to}: {message}"))
        }
        None => StorageError::Request(format!("renaming {from} to {to}: {message}")),
        _ => StorageError::RenameFailed {
            from: from.to_string(),
            to: to.to_string(),
            message,
        },
    }
}

fn acl_error(status: Option<u16>, object: &ObjectName, message: String) -> StorageError {
    match status {
        Some(404) => StorageError::ObjectNotFound(object.to_string()),
        _ => StorageError::AclFailed {
            object: object.to_string(),
            message,
        },
    }
}

fn stored_object(object: &Object) -> StoredObject {
    StoredObject {
        name: object.name.clone(),
        size: u64::try_from(object.size).unwrap_or_default(),
        md5_hash: object.md5_hash.clone(),
        generation: Some(object.generation.to_string()),
        updated: object
            .updated
            .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), t.nanosecond())),
    }
}
