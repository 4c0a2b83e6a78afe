//! Storage service implementation using Apache OpenDAL.

use billflow_shared::config::StorageProvider;
use opendal::{ErrorKind, Operator, services};

use super::error::StorageError;

/// Storage service for templates and rendered statements.
#[derive(Clone)]
pub struct StorageService {
    operator: Operator,
    provider_name: &'static str,
}

impl StorageService {
    /// Create a new storage service from the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_provider(provider: &StorageProvider) -> Result<Self, StorageError> {
        let operator = Self::create_operator(provider)?;
        Ok(Self {
            operator,
            provider_name: provider.name(),
        })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
        }
    }

    /// Write bytes under `key`; intermediate directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.operator
            .write(key, bytes)
            .await
            .map(|_| ())
            .map_err(StorageError::from)
    }

    /// Read the full object under `key`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the object does not exist.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match self.operator.read(key).await {
            Ok(buffer) => Ok(buffer.to_vec()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Check if a file exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error for any storage failure other than a missing object.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.operator.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}

/// Joins key segments with `/`, dropping empty segments and stray slashes.
#[must_use]
pub fn join_key(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Sanitize a name for use in a storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
