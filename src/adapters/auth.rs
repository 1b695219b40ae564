//! Credential resolution
//!
//! Both service clients authenticate with the same credentials. An explicit
//! credentials file or inline JSON wins; otherwise Application Default
//! Credentials are resolved by the client libraries themselves.

use crate::config::AuthConfig;
use crate::domain::{ExporterError, Result};
use gcloud_auth::credentials::CredentialsFile;
use secrecy::ExposeSecret;

/// Where the credentials come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `GOOGLE_APPLICATION_CREDENTIALS`, gcloud user credentials or the
    /// metadata server
    ApplicationDefault,

    /// `auth.credentials_path`
    File,

    /// `auth.credentials_json`
    Inline,
}

impl CredentialSource {
    /// Source selected by configuration
    pub fn from_config(config: &AuthConfig) -> Self {
        if config.credentials_json.is_some() {
            CredentialSource::Inline
        } else if config.credentials_path.is_some() {
            CredentialSource::File
        } else {
            CredentialSource::ApplicationDefault
        }
    }
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::ApplicationDefault => write!(f, "application default credentials"),
            CredentialSource::File => write!(f, "credentials file"),
            CredentialSource::Inline => write!(f, "inline credentials"),
        }
    }
}

/// Loads explicitly configured credentials
///
/// Returns `None` when Application Default Credentials should be used.
///
/// # Errors
///
/// Returns `ExporterError::Authentication` if the configured file cannot be
/// read or the credentials JSON is malformed
pub async fn load_credentials(config: &AuthConfig) -> Result<Option<CredentialsFile>> {
    if let Some(json) = &config.credentials_json {
        let credentials = serde_json::from_str::<CredentialsFile>(json.expose_secret().as_ref())
            .map_err(|e| {
                ExporterError::Authentication(format!("Invalid auth.credentials_json: {e}"))
            })?;
        return Ok(Some(credentials));
    }

    if let Some(path) = &config.credentials_path {
        let credentials = CredentialsFile::new_from_file(path.clone())
            .await
            .map_err(|e| {
                ExporterError::Authentication(format!(
                    "Failed to read credentials file {path}: {e}"
                ))
            })?;
        return Ok(Some(credentials));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_source_selection() {
        assert_eq!(
            CredentialSource::from_config(&AuthConfig::default()),
            CredentialSource::ApplicationDefault
        );

        let file = AuthConfig {
            credentials_path: Some("/etc/machtry/sa.json".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(CredentialSource::from_config(&file), CredentialSource::File);

        let inline = AuthConfig {
            credentials_json: Some(secret_string("{}".to_string())),
            ..AuthConfig::default()
        };
        assert_eq!(
            CredentialSource::from_config(&inline),
            CredentialSource::Inline
        );
    }

    #[tokio::test]
    async fn test_application_default_loads_nothing() {
        let loaded = load_credentials(&AuthConfig::default()).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_malformed_inline_credentials() {
        let config = AuthConfig {
            credentials_json: Some(secret_string("not json".to_string())),
            ..AuthConfig::default()
        };
        let result = load_credentials(&config).await;
        assert!(matches!(result, Err(ExporterError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_missing_credentials_file() {
        let config = AuthConfig {
            credentials_path: Some("/nonexistent/machtry/sa.json".to_string()),
            ..AuthConfig::default()
        };
        let err = load_credentials(&config).await.err().unwrap();
        assert!(matches!(err, ExporterError::Authentication(_)));
        assert!(err.to_string().contains("/nonexistent/machtry/sa.json"));
    }
}
