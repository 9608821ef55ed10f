//! Credential resolution against the secret store.
//!
//! The store returns either a text secret (a JSON object with `username`
//! and `password`) or a binary secret. Binary secrets are base64-decoded
//! when they hold base64 text and then parsed the same way as text secrets,
//! so both shapes resolve to a [`Secret`].

use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;

use crate::error::{LoaderError, LoaderResult};
use crate::types::Secret;

/// Raw secret value as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretPayload {
    Text(String),
    Binary(Vec<u8>),
}

/// Read access to a managed secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the current value of `secret_id`.
    ///
    /// Rejections (not found, access denied, decryption failure) surface
    /// as [`LoaderError::SecretAccess`].
    async fn get_secret_value(&self, secret_id: &str) -> LoaderResult<SecretPayload>;
}

/// Resolves database credentials from a [`SecretStore`].
pub struct CredentialResolver<'a> {
    store: &'a dyn SecretStore,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(store: &'a dyn SecretStore) -> Self {
        Self { store }
    }

    /// Fetch `secret_id` and extract the username/password pair.
    ///
    /// Store errors propagate unchanged; there is no retry.
    pub async fn resolve(&self, secret_id: &str) -> LoaderResult<Secret> {
        let payload = self.store.get_secret_value(secret_id).await?;
        let secret = parse_secret(payload)?;
        tracing::info!(secret_id, username = %secret.username, "Resolved database credentials");
        Ok(secret)
    }
}

/// Turn a raw store payload into a [`Secret`].
pub fn parse_secret(payload: SecretPayload) -> LoaderResult<Secret> {
    let text = match payload {
        SecretPayload::Text(text) => text,
        SecretPayload::Binary(bytes) => decode_binary_secret(&bytes)?,
    };

    let value: Value = serde_json::from_str(&text)
        .map_err(|e| LoaderError::MalformedSecret(format!("secret is not valid JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| LoaderError::MalformedSecret("secret must be a JSON object".into()))?;

    Ok(Secret {
        username: string_field(obj, "username")?,
        password: string_field(obj, "password")?,
    })
}

/// Base64-decode the binary payload if it is base64 text, otherwise use it
/// as-is, then require UTF-8.
fn decode_binary_secret(bytes: &[u8]) -> LoaderResult<String> {
    let trimmed = bytes.trim_ascii();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(trimmed)
        .unwrap_or_else(|_| trimmed.to_vec());
    String::from_utf8(decoded)
        .map_err(|e| LoaderError::MalformedSecret(format!("binary secret is not UTF-8: {e}")))
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &'static str) -> LoaderResult<String> {
    match obj.get(key) {
        None => Err(LoaderError::MissingKey(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(LoaderError::MalformedSecret(format!(
            "secret key '{key}' must be a string"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use base64::Engine;

    use super::*;

    struct FixedStore(LoaderResult<SecretPayload>);

    #[async_trait]
    impl SecretStore for FixedStore {
        async fn get_secret_value(&self, secret_id: &str) -> LoaderResult<SecretPayload> {
            match &self.0 {
                Ok(payload) => Ok(payload.clone()),
                Err(_) => Err(LoaderError::SecretAccess {
                    secret_id: secret_id.to_string(),
                    message: "ResourceNotFoundException".to_string(),
                }),
            }
        }
    }

    #[test]
    fn text_secret_yields_username_and_password() {
        for (user, pass) in [("admin", "p@ss"), ("", ""), ("ü", "{\"json\"}")] {
            let json = serde_json::json!({ "username": user, "password": pass }).to_string();
            let secret = parse_secret(SecretPayload::Text(json)).expect("parse");
            assert_eq!(secret, Secret::new(user, pass));
        }
    }

    #[test]
    fn extra_keys_are_ignored() {
        let json = r#"{"username":"u","password":"p","engine":"mysql","port":3306}"#;
        let secret = parse_secret(SecretPayload::Text(json.into())).expect("parse");
        assert_eq!(secret, Secret::new("u", "p"));
    }

    #[test]
    fn missing_password_is_missing_key() {
        let json = r#"{"username":"u"}"#;
        assert_matches!(
            parse_secret(SecretPayload::Text(json.into())),
            Err(LoaderError::MissingKey("password"))
        );
    }

    #[test]
    fn missing_username_is_missing_key() {
        let json = r#"{"password":"p"}"#;
        assert_matches!(
            parse_secret(SecretPayload::Text(json.into())),
            Err(LoaderError::MissingKey("username"))
        );
    }

    #[test]
    fn non_json_is_malformed() {
        assert_matches!(
            parse_secret(SecretPayload::Text("username=u".into())),
            Err(LoaderError::MalformedSecret(_))
        );
    }

    #[test]
    fn json_array_is_malformed() {
        assert_matches!(
            parse_secret(SecretPayload::Text("[1,2]".into())),
            Err(LoaderError::MalformedSecret(_))
        );
    }

    #[test]
    fn binary_base64_secret_is_decoded() {
        let json = r#"{"username":"bin","password":"ary"}"#;
        let encoded = base64::engine::general_purpose::STANDARD.encode(json);
        let secret = parse_secret(SecretPayload::Binary(encoded.into_bytes())).expect("parse");
        assert_eq!(secret, Secret::new("bin", "ary"));
    }

    #[test]
    fn binary_raw_json_secret_is_accepted() {
        let json = br#"{"username":"raw","password":"bytes"}"#;
        let secret = parse_secret(SecretPayload::Binary(json.to_vec())).expect("parse");
        assert_eq!(secret, Secret::new("raw", "bytes"));
    }

    #[test]
    fn binary_non_utf8_is_malformed() {
        assert_matches!(
            parse_secret(SecretPayload::Binary(vec![0xff, 0xfe, 0x00])),
            Err(LoaderError::MalformedSecret(_))
        );
    }

    #[tokio::test]
    async fn resolver_returns_parsed_secret() {
        let store = FixedStore(Ok(SecretPayload::Text(
            r#"{"username":"U","password":"P"}"#.into(),
        )));
        let secret = CredentialResolver::new(&store)
            .resolve("/source/db/password")
            .await
            .expect("resolve");
        assert_eq!(secret, Secret::new("U", "P"));
    }

    #[tokio::test]
    async fn resolver_propagates_store_rejection() {
        let store = FixedStore(Err(LoaderError::Repository("unused".into())));
        let err = CredentialResolver::new(&store)
            .resolve("/missing")
            .await
            .expect_err("should fail");
        assert_matches!(err, LoaderError::SecretAccess { secret_id, .. } if secret_id == "/missing");
    }
}
