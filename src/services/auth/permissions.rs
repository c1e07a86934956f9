use crate::services::auth::{claims::Claims, error::AuthError};

/// Confirms that `claims` grant `required`.
///
/// An empty `required` means the route only needs a valid token.
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthError> {
    if required.is_empty() {
        return Ok(());
    }

    let permissions = claims
        .permissions
        .as_deref()
        .ok_or(AuthError::PermissionsClaimMissing)?;

    if !permissions.iter().any(|p| p == required) {
        return Err(AuthError::PermissionDenied {
            required: required.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::claims::Audience;

    fn claims(permissions: Option<&[&str]>) -> Claims {
        Claims {
            iss: "https://issuer/".into(),
            aud: Audience::One("api".into()),
            exp: u64::MAX,
            sub: None,
            iat: None,
            permissions: permissions.map(|p| p.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn empty_requirement_always_passes() {
        assert!(check_permission("", &claims(None)).is_ok());
        assert!(check_permission("", &claims(Some(&[]))).is_ok());
    }

    #[test]
    fn missing_claim_is_distinct_from_missing_entry() {
        assert!(matches!(
            check_permission("post:drinks", &claims(None)),
            Err(AuthError::PermissionsClaimMissing)
        ));
        assert!(matches!(
            check_permission("post:drinks", &claims(Some(&[]))),
            Err(AuthError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn granted_permission_passes() {
        let c = claims(Some(&["get:drinks-detail", "post:drinks"]));
        assert!(check_permission("post:drinks", &c).is_ok());
        assert!(matches!(
            check_permission("delete:drinks", &c),
            Err(AuthError::PermissionDenied { required }) if required == "delete:drinks"
        ));
    }
}
