//! Manage json web tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Token;
use crate::user::UserId;

const DEFAULT_AUDIENCE: &str = "devhub";
pub const EXPIRATION_TIME: u64 = 60 * 15; // 15 minutes.

/// Errors raised while building a [`TokenManager`] or signing a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("`token` entry needs either `secret` or `public_key_pem`")]
    MissingKey,
    #[error("no signing key configured")]
    ReadOnly,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Time(#[from] std::time::SystemTimeError),
}

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Recipients that the JWT is intended for.
    pub aud: String,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
}

/// Verify (and optionally sign) JWT tokens.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    public_key: DecodingKey,
    private_key: Option<EncodingKey>,
    name: String,
    audience: String,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("algorithm", &self.algorithm)
            .field("name", &self.name)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a [`TokenManager`] sharing an HMAC secret with the issuer.
    pub fn with_secret(name: &str, secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            public_key: DecodingKey::from_secret(secret.as_bytes()),
            private_key: Some(EncodingKey::from_secret(secret.as_bytes())),
            name: name.to_owned(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }

    /// Create a [`TokenManager`] from an ECDSA key pair.
    ///
    /// The private key is optional: without it tokens are only verified.
    pub fn with_ec_pem(
        name: &str,
        public_key_pem: &str,
        private_key_pem: Option<&str>,
    ) -> Result<Self, TokenError> {
        let public_key = DecodingKey::from_ec_pem(public_key_pem.as_bytes())?;
        let private_key = private_key_pem
            .filter(|pem| !pem.is_empty())
            .map(|pem| EncodingKey::from_ec_pem(pem.as_bytes()))
            .transpose()?;

        Ok(Self {
            algorithm: Algorithm::ES384,
            public_key,
            private_key,
            name: name.to_owned(),
            audience: DEFAULT_AUDIENCE.to_string(),
        })
    }

    /// Build from the `token` configuration entry.
    pub fn from_config(name: &str, config: &Token) -> Result<Self, TokenError> {
        let mut manager = match (&config.secret, &config.public_key_pem) {
            (Some(secret), _) if !secret.is_empty() => Self::with_secret(name, secret),
            (_, Some(public_key_pem)) => {
                Self::with_ec_pem(name, public_key_pem, config.private_key_pem.as_deref())?
            },
            _ => return Err(TokenError::MissingKey),
        };

        if let Some(audience) = &config.audience {
            manager.audience(audience);
        }

        Ok(manager)
    }

    /// Set `audience` field on JWT.
    pub fn audience(&mut self, audience: &str) {
        self.audience = audience.to_owned();
    }

    /// Create a new [`jsonwebtoken`].
    pub fn create(&self, user_id: &str) -> Result<String, TokenError> {
        let Some(private_key) = &self.private_key else {
            return Err(TokenError::ReadOnly);
        };

        let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let header = Header::new(self.algorithm);
        let claims = Claims {
            aud: self.audience.clone(),
            exp: time + EXPIRATION_TIME,
            iat: time,
            iss: self.name.clone(),
            sub: user_id.to_owned(),
        };

        Ok(encode(&header, &claims, private_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.name]);

        Ok(decode::<Claims>(token, &self.public_key, &validation)?.claims)
    }

    /// Resolve a token into the identity it was issued for.
    ///
    /// Any failure (bad signature, expiry, wrong issuer or a subject that is
    /// not a valid identifier) collapses into `None`.
    pub fn verify(&self, token: &str) -> Option<UserId> {
        match self.decode(token) {
            Ok(claims) => UserId::parse(claims.sub).ok(),
            Err(err) => {
                tracing::debug!(error = %err, "token rejected");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-very-long-shared-secret-for-tests";

    #[test]
    fn test_create_then_verify() {
        let manager = TokenManager::with_secret("https://devhub.test/", SECRET);
        let token = manager.create("alice").unwrap();

        assert_eq!(manager.verify(&token).unwrap().as_str(), "alice");

        let claims = manager.decode(&token).unwrap();
        assert_eq!(claims.iss, "https://devhub.test/");
        assert_eq!(claims.aud, DEFAULT_AUDIENCE);
        assert_eq!(claims.exp - claims.iat, EXPIRATION_TIME);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let issuer = TokenManager::with_secret("devhub", "another-secret-entirely-different");
        let verifier = TokenManager::with_secret("devhub", SECRET);
        let token = issuer.create("alice").unwrap();

        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let mut issuer = TokenManager::with_secret("devhub", SECRET);
        issuer.audience("somewhere.else");
        let verifier = TokenManager::with_secret("devhub", SECRET);
        let token = issuer.create("alice").unwrap();

        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn test_rejects_expired() {
        let manager = TokenManager::with_secret("devhub", SECRET);
        let claims = Claims {
            aud: DEFAULT_AUDIENCE.into(),
            exp: 1_000,
            iat: 100,
            iss: "devhub".into(),
            sub: "alice".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(manager.verify(&token).is_none());
    }

    #[test]
    fn test_rejects_garbage() {
        let manager = TokenManager::with_secret("devhub", SECRET);

        assert!(manager.verify("").is_none());
        assert!(manager.verify("not.a.jwt").is_none());
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Token {
            secret: None,
            public_key_pem: None,
            private_key_pem: None,
            audience: None,
        };

        assert!(matches!(
            TokenManager::from_config("devhub", &config),
            Err(TokenError::MissingKey)
        ));
    }
}
