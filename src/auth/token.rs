//! Issues and verifies the HS256 access tokens that identify a logged in user.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, auth::SigningKeys, user::UserID};

/// How long an access token is valid for after it is issued.
pub const TOKEN_LIFETIME_SECONDS: i64 = 30 * 60;

/// The identity claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The service that issued the token.
    pub iss: String,
    /// The user's ID as a decimal string.
    pub sub: String,
    /// The user's email address.
    pub email: String,
    /// A random ID for the token. Only used for auditing, it is never checked.
    pub jti: String,
    /// When the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// When the token expires, in seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// The ID of the user the token was issued to, or `None` if `sub` is not an integer.
    pub fn user_id(&self) -> Option<UserID> {
        self.sub.parse().ok().map(UserID::new)
    }
}

/// Issues and verifies access tokens with keys derived from the server secret.
#[derive(Debug, Clone)]
pub struct TokenService {
    keys: Arc<SigningKeys>,
    issuer: String,
}

impl TokenService {
    /// Create a token service that signs with a key derived from `secret` and
    /// names `issuer` in the `iss` claim.
    pub fn new(secret: &str, issuer: &str) -> Self {
        Self {
            keys: Arc::new(SigningKeys::from_secret(secret)),
            issuer: issuer.to_owned(),
        }
    }

    /// Issue a token for a user that expires [TOKEN_LIFETIME_SECONDS] from now.
    ///
    /// # Errors
    /// Returns [Error::TokenSigningError] if the token could not be signed.
    pub fn issue(&self, user_id: UserID, email: &str) -> Result<String, Error> {
        self.issue_at(user_id, email, OffsetDateTime::now_utc())
    }

    /// Issue a token as though the current time is `now`.
    ///
    /// # Errors
    /// Returns [Error::TokenSigningError] if the token could not be signed.
    pub fn issue_at(
        &self,
        user_id: UserID,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<String, Error> {
        let iat = now.unix_timestamp();

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            email: email.to_owned(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: iat + TOKEN_LIFETIME_SECONDS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding).map_err(|error| {
            tracing::error!("could not sign access token for user {user_id}: {error}");
            Error::TokenSigningError(error.to_string())
        })
    }

    /// Check the signature and expiry of `token` and return its claims.
    ///
    /// Returns `None` if the token is malformed, was signed with another key,
    /// is missing `exp` or `sub`, or has expired. The reason is only logged.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        match decode::<Claims>(token, &self.keys.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(error) => {
                match error.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                    ErrorKind::InvalidSignature => {
                        tracing::debug!("rejected token with invalid signature")
                    }
                    _ => tracing::debug!("rejected malformed token: {error}"),
                }

                None
            }
        }
    }
}
