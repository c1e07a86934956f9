//! Authorization failure taxonomy.
//!
//! Every variant is fatal to the current request. Nothing here is retried;
//! the request boundary turns it into the standard error envelope.
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Unable to parse authentication token: {0}")]
    MalformedToken(String),

    #[error("Unable to find the appropriate key.")]
    UnknownSigningKey { kid: String },

    #[error("Token signature is invalid.")]
    SignatureInvalid,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    ClaimsMismatch,

    #[error("Permissions not included in JWT.")]
    PermissionsClaimMissing,

    #[error("Permission not found.")]
    PermissionDenied { required: String },

    #[error("signing keys are unavailable: {0}")]
    KeySourceUnavailable(String),
}

impl AuthError {
    /// Machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "authorization_header_missing",
            Self::MalformedHeader(_) => "invalid_header",
            Self::MalformedToken(_) => "invalid_token",
            Self::UnknownSigningKey { .. } => "unknown_signing_key",
            Self::SignatureInvalid => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::ClaimsMismatch => "invalid_claims",
            Self::PermissionsClaimMissing => "permissions_claim_missing",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::KeySourceUnavailable(_) => "key_source_unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingHeader
            | Self::MalformedHeader(_)
            | Self::UnknownSigningKey { .. }
            | Self::SignatureInvalid
            | Self::TokenExpired
            | Self::ClaimsMismatch => StatusCode::UNAUTHORIZED,
            Self::MalformedToken(_) | Self::PermissionsClaimMissing => StatusCode::BAD_REQUEST,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            // The issuer being unreachable is not the caller's fault.
            Self::KeySourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
