use anyhow::Result;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Decides whether a download token grants access to a file.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> bool;
}

/// Accepts every token. The token route is effectively unauthenticated while this is active.
#[derive(Debug, Default)]
pub struct AcceptAllTokens;

impl TokenValidator for AcceptAllTokens {
    fn validate(&self, _token: &str) -> bool {
        true
    }
}

/// HS256 JWT validation against a shared secret.
pub struct JwtTokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation: Validation::default(),
        }
    }

    pub fn decode(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

impl TokenValidator for JwtTokenValidator {
    fn validate(&self, token: &str) -> bool {
        match self.decode(token) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Rejected download token: {}", e);
                false
            }
        }
    }
}
