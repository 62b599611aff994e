use axum::http::{header::AUTHORIZATION, HeaderMap};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, utils::verify_token};

pub const CATALOG_READ: &str = "catalog:read";
pub const CATALOG_WRITE: &str = "catalog:write";
pub const CATALOG_DELETE: &str = "catalog:delete";
pub const PURCHASING_READ: &str = "purchasing:read";
pub const PURCHASING_WRITE: &str = "purchasing:write";
pub const SEQUENCES_READ: &str = "sequences:read";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub subject: String,
    pub permissions: Vec<String>,
}

impl CurrentUser {
    pub fn has(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn require(&self, permission: &'static str) -> Result<(), AppError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(permission))
        }
    }
}

/// Resolves the caller from an `Authorization: Bearer <jwt>` header.
pub fn get_current_user(headers: &HeaderMap, secret: &str) -> Result<CurrentUser, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(token, secret).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        AppError::Unauthorized
    })?;

    Ok(CurrentUser {
        subject: claims.sub,
        permissions: claims.permissions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::create_token;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn valid_token_yields_permissions() {
        let token = create_token(
            "buyer".to_string(),
            vec![PURCHASING_READ.to_string(), PURCHASING_WRITE.to_string()],
            Duration::hours(1),
            "secret",
        )
        .unwrap();

        let user = get_current_user(&headers_with(&token), "secret").unwrap();
        assert_eq!(user.subject, "buyer");
        assert!(user.require(PURCHASING_WRITE).is_ok());
        assert!(matches!(
            user.require(CATALOG_DELETE),
            Err(AppError::Forbidden(CATALOG_DELETE))
        ));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = get_current_user(&HeaderMap::new(), "secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let err = get_current_user(&headers_with("not-a-jwt"), "secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
