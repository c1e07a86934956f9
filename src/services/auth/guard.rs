//! Bearer extraction → key resolution → verification → permission check,
//! composed into one value that sits in front of a protected operation.
use std::{future::Future, sync::Arc};

use axum::http::HeaderMap;

use crate::services::auth::{
    AuthService, bearer::bearer_token, claims::Claims, error::AuthError,
    permissions::check_permission,
};

#[derive(Debug, Clone)]
pub struct Guard {
    permission: String,
    auth: Arc<AuthService>,
}

impl Guard {
    /// `permission` may be empty: any valid token is then accepted.
    pub fn new(permission: impl Into<String>, auth: Arc<AuthService>) -> Self {
        Self {
            permission: permission.into(),
            auth,
        }
    }

    /// Run the whole chain and hand back the verified claims.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let result: Result<Claims, AuthError> = async {
            let token = bearer_token(headers)?;
            let claims = self.auth.verify(token).await?;
            check_permission(&self.permission, &claims)?;
            Ok(claims)
        }
        .await;

        if let Err(err) = &result {
            tracing::warn!(
                code = err.code(),
                permission = %self.permission,
                error = %err,
                "authorization failed"
            );
        }

        result
    }

    /// Authorize, then call `op` with the claims. `op` never runs when
    /// authorization fails.
    pub async fn run<F, Fut, T>(&self, headers: &HeaderMap, op: F) -> Result<T, AuthError>
    where
        F: FnOnce(Claims) -> Fut,
        Fut: Future<Output = T>,
    {
        let claims = self.authorize(headers).await?;
        Ok(op(claims).await)
    }
}
