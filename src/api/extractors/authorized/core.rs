use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{Claims, Guard};
use crate::state::AppState;

use super::types::RequiredPermission;

/// Handler argument carrying verified claims that grant `P`.
///
/// Extraction runs the full Guard (bearer → keys → verify → permission);
/// any failure rejects the request before the handler body runs.
#[derive(Debug)]
pub struct Authorized<P> {
    pub claims: Claims,
    _permission: PhantomData<P>,
}

impl<P: RequiredPermission> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = Guard::new(P::NAME, state.auth.clone())
            .authorize(&parts.headers)
            .await?;

        Ok(Self {
            claims,
            _permission: PhantomData,
        })
    }
}
