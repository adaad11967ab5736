//! Repository secret provisioning
//!
//! The platform API key is sealed against the repository's X25519 public
//! key with sealed-box encryption before upload, so the source host never
//! sees the plaintext.

use crate::github::client::{GithubClient, RemoteRepository};
use crate::github::SecretError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// A repository's sealed-box public key
#[derive(Debug, Clone, Deserialize)]
pub struct RepoPublicKey {
    pub key_id: String,
    /// Base64-encoded 32-byte X25519 public key
    pub key: String,
}

/// A sealed secret value ready for upload
#[derive(Debug, Clone)]
pub struct SealedSecret {
    pub encrypted_value: String,
    pub key_id: String,
}

/// Seals a plaintext secret against a repository public key
///
/// # Errors
///
/// Returns `SecretError::InvalidKey` for malformed keys and
/// `SecretError::Seal` if encryption fails.
pub fn seal_secret(public_key: &RepoPublicKey, plaintext: &str) -> Result<SealedSecret, SecretError> {
    let key_bytes = STANDARD
        .decode(&public_key.key)
        .map_err(|e| SecretError::InvalidKey(format!("not valid base64: {}", e)))?;

    let key_array: [u8; 32] = key_bytes
        .as_slice()
        .try_into()
        .map_err(|_| SecretError::InvalidKey(format!("expected 32 bytes, got {}", key_bytes.len())))?;

    let recipient = PublicKey::from(key_array);
    let sealed = recipient
        .seal(&mut OsRng, plaintext.as_bytes())
        .map_err(|e| SecretError::Seal(e.to_string()))?;

    Ok(SealedSecret {
        encrypted_value: STANDARD.encode(sealed),
        key_id: public_key.key_id.clone(),
    })
}

impl GithubClient {
    /// Fetches the repository's secrets public key
    pub async fn fetch_secret_public_key(
        &self,
        repo: &RemoteRepository,
    ) -> Result<RepoPublicKey, SecretError> {
        let url = format!(
            "{}/repos/{}/actions/secrets/public-key",
            self.endpoint(),
            repo.full_name()
        );
        let response = self
            .http()
            .get(&url)
            .send()
            .await
            .map_err(|e| SecretError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::KeyFetch {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SecretError::InvalidKey(e.to_string()))
    }

    /// Uploads a sealed value as a named repository secret
    pub async fn put_repo_secret(
        &self,
        repo: &RemoteRepository,
        name: &str,
        sealed: &SealedSecret,
    ) -> Result<(), SecretError> {
        let url = format!(
            "{}/repos/{}/actions/secrets/{}",
            self.endpoint(),
            repo.full_name(),
            name
        );
        let response = self
            .http()
            .put(&url)
            .json(&json!({
                "encrypted_value": sealed.encrypted_value,
                "key_id": sealed.key_id,
            }))
            .send()
            .await
            .map_err(|e| SecretError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::Upload {
                status: status.as_u16(),
                message: body,
            });
        }

        info!("Provisioned secret {} on {}", name, repo.full_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_box::SecretKey;

    #[test]
    fn test_seal_roundtrip() {
        let recipient_sk = SecretKey::generate(&mut OsRng);
        let recipient_pk = recipient_sk.public_key();

        let repo_key = RepoPublicKey {
            key_id: "568250167242549743".to_string(),
            key: STANDARD.encode(recipient_pk.as_bytes()),
        };

        let sealed = seal_secret(&repo_key, "heroku-api-key-value").unwrap();
        assert_eq!(sealed.key_id, repo_key.key_id);

        let ciphertext = STANDARD.decode(&sealed.encrypted_value).unwrap();
        let opened = recipient_sk.unseal(&ciphertext).unwrap();
        assert_eq!(opened, b"heroku-api-key-value");
    }

    #[test]
    fn test_seal_is_randomized() {
        let recipient_sk = SecretKey::generate(&mut OsRng);
        let repo_key = RepoPublicKey {
            key_id: "1".to_string(),
            key: STANDARD.encode(recipient_sk.public_key().as_bytes()),
        };

        let a = seal_secret(&repo_key, "same-value").unwrap();
        let b = seal_secret(&repo_key, "same-value").unwrap();
        assert_ne!(a.encrypted_value, b.encrypted_value);
    }

    #[test]
    fn test_invalid_base64_key_rejected() {
        let repo_key = RepoPublicKey {
            key_id: "1".to_string(),
            key: "!!not-base64!!".to_string(),
        };
        assert!(matches!(
            seal_secret(&repo_key, "value"),
            Err(SecretError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_wrong_length_key_rejected() {
        let repo_key = RepoPublicKey {
            key_id: "1".to_string(),
            key: STANDARD.encode(b"too short"),
        };
        assert!(matches!(
            seal_secret(&repo_key, "value"),
            Err(SecretError::InvalidKey(_))
        ));
    }
}
