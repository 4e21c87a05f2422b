//! Session token decoding.
//!
//! The sign-in response carries a JWT whose claims describe the user and the
//! workspace, so login needs no second round trip. Whether the signature is
//! checked locally is a configuration choice ([`TokenPolicy`]): deployments
//! behind a verifying gateway trust the payload, others verify it here.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use crate::{Token, TokenError, User, Workspace};

/// How token signatures are treated.
#[derive(Clone)]
pub enum TokenPolicy {
    /// Decode claims without checking signature or expiry.
    Trust,
    /// Check signature and expiry with the given key.
    Verify {
        /// Key matching the server's signing key.
        key: DecodingKey,
        /// Expected signing algorithm.
        algorithm: Algorithm,
    },
}

impl TokenPolicy {
    /// Verify Ed25519-signed tokens against a PEM-encoded public key.
    pub fn verify_ed_pem(pem: &[u8]) -> Result<Self, TokenError> {
        let key = DecodingKey::from_ed_pem(pem).map_err(|e| TokenError::Malformed(e.to_string()))?;
        Ok(Self::Verify { key, algorithm: Algorithm::EdDSA })
    }

    /// Verify HMAC-SHA256 tokens against a shared secret.
    pub fn verify_secret(secret: &[u8]) -> Self {
        Self::Verify { key: DecodingKey::from_secret(secret), algorithm: Algorithm::HS256 }
    }
}

impl fmt::Debug for TokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trust => f.write_str("Trust"),
            Self::Verify { algorithm, .. } => {
                f.debug_struct("Verify").field("algorithm", algorithm).finish_non_exhaustive()
            },
        }
    }
}

/// Identity carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// The signed-in user.
    pub user: User,
    /// The user's workspace.
    pub workspace: Workspace,
}

/// Decodes session tokens according to a [`TokenPolicy`].
#[derive(Debug, Clone)]
pub struct TokenDecoder {
    policy: TokenPolicy,
}

impl TokenDecoder {
    /// Create a decoder with the given policy.
    pub fn new(policy: TokenPolicy) -> Self {
        Self { policy }
    }

    /// Decoder that trusts token payloads.
    pub fn trusting() -> Self {
        Self::new(TokenPolicy::Trust)
    }

    /// Active policy.
    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Decode the user and workspace from `token`.
    pub fn decode(&self, token: &Token) -> Result<SessionIdentity, TokenError> {
        let (key, validation) = match &self.policy {
            TokenPolicy::Trust => {
                let mut validation = Validation::default();
                validation.insecure_disable_signature_validation();
                validation.validate_exp = false;
                validation.validate_aud = false;
                validation.required_spec_claims.clear();
                (DecodingKey::from_secret(&[]), validation)
            },
            TokenPolicy::Verify { key, algorithm } => {
                let mut validation = Validation::new(*algorithm);
                validation.validate_exp = true;
                validation.validate_aud = false;
                validation.required_spec_claims.clear();
                (key.clone(), validation)
            },
        };

        let data =
            jsonwebtoken::decode::<User>(token.as_str(), &key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::Rejected(e.to_string())
                    },
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        let user = data.claims;
        let workspace = Workspace {
            id: user.workspace_id,
            name: user.workspace_name.clone().unwrap_or_default(),
        };

        Ok(SessionIdentity { user, workspace })
    }
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self::trusting()
    }
}
