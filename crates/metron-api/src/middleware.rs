//! Middleware: authentication extraction and security headers.

use axum::{extract::Request, http::header, middleware::Next, response::Response};
use metron_common::error::MetronError;
use metron_common::models::user_flags;

use crate::auth;

/// Authentication context extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub flags: i64,
}

impl AuthContext {
    /// Catalog writes need the EDITOR or STAFF flag.
    pub fn require_editor(&self) -> Result<(), MetronError> {
        if user_flags::can_edit(self.flags) {
            Ok(())
        } else {
            Err(MetronError::MissingPermission {
                permission: "EDITOR".into(),
            })
        }
    }

    pub fn is_staff(&self) -> bool {
        user_flags::has(self.flags, user_flags::STAFF)
    }

    pub fn require_staff(&self) -> Result<(), MetronError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(MetronError::MissingPermission {
                permission: "STAFF".into(),
            })
        }
    }
}

/// Extract and validate the JWT from the Authorization: Bearer <token> header.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, MetronError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(MetronError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(MetronError::Unauthorized)?;

    let config = metron_common::config::get();
    let claims = auth::validate_token(token, &config.auth.jwt_secret).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => MetronError::TokenExpired,
            _ => MetronError::InvalidToken,
        }
    })?;

    // Refresh tokens only work on /auth/refresh
    if claims.token_type != auth::ACCESS {
        return Err(MetronError::InvalidToken);
    }

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| MetronError::InvalidToken)?;

    request.extensions_mut().insert(AuthContext {
        user_id,
        username: claims.username,
        flags: claims.flags,
    });

    Ok(next.run(request).await)
}

/// Add security headers to every HTTP response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    macro_rules! set {
        ($name:expr, $val:expr) => {
            if let Ok(v) = $val.parse::<axum::http::HeaderValue>() {
                h.insert(axum::http::header::HeaderName::from_static($name), v);
            }
        };
    }

    set!("x-content-type-options", "nosniff");
    set!("x-frame-options", "DENY");
    set!("referrer-policy", "strict-origin-when-cross-origin");
    set!(
        "strict-transport-security",
        "max-age=63072000; includeSubDomains"
    );
    set!("content-security-policy", "default-src 'none'; frame-ancestors 'none'");

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(flags: i64) -> AuthContext {
        AuthContext {
            user_id: 1,
            username: "tester".into(),
            flags,
        }
    }

    #[test]
    fn editor_checks() {
        assert!(ctx(user_flags::ACTIVE).require_editor().is_err());
        assert!(ctx(user_flags::ACTIVE | user_flags::EDITOR).require_editor().is_ok());
        assert!(ctx(user_flags::ACTIVE | user_flags::STAFF).require_editor().is_ok());
    }

    #[test]
    fn staff_checks() {
        assert!(ctx(user_flags::ACTIVE | user_flags::EDITOR).require_staff().is_err());
        assert!(ctx(user_flags::ACTIVE | user_flags::STAFF).require_staff().is_ok());
        assert!(!ctx(user_flags::ACTIVE | user_flags::EDITOR).is_staff());
    }

    fn guarded() -> axum::Router {
        use axum::{middleware, routing::get};

        axum::Router::new()
            .route("/issue", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(auth_middleware))
            .layer(middleware::from_fn(security_headers))
    }

    #[tokio::test]
    async fn missing_bearer_is_rejected() {
        use axum::{body::Body, http::StatusCode};
        use tower::ServiceExt;

        let response = guarded()
            .oneshot(axum::http::Request::builder().uri("/issue").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = guarded()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/issue")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn security_headers_survive_errors() {
        use axum::body::Body;
        use tower::ServiceExt;

        let response = guarded()
            .oneshot(axum::http::Request::builder().uri("/issue").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
    }
}
