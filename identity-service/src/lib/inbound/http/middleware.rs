use std::sync::Arc;

use auth::AccessDenied;
use auth::Authenticator;
use auth::IdentityResolution;
use auth::ResolvedIdentity;
use auth::UnauthenticatedReason;
use auth::ValidationFailure;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use http::header::AUTHORIZATION;
use http::request::Parts;

use super::handlers::ApiError;

/// Middleware that resolves the caller identity from the `Authorization` header.
///
/// Never rejects a request: the outcome is stored in request extensions as an
/// `IdentityResolution` and the route guard decides what it means. Valid
/// tokens also store a `ResolvedIdentity` for handlers.
pub async fn resolve_identity(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Response {
    let resolution = match req.headers().get(AUTHORIZATION) {
        None => IdentityResolution::Anonymous,
        Some(value) => match value.to_str() {
            Ok(header) => authenticator.resolve(Some(header), Utc::now()),
            Err(_) => IdentityResolution::Rejected(ValidationFailure::Malformed),
        },
    };

    match &resolution {
        IdentityResolution::Authenticated(identity) => {
            tracing::debug!(subject = %identity.subject, role = %identity.role, "Caller authenticated");
            req.extensions_mut().insert(identity.clone());
        }
        IdentityResolution::Rejected(reason) => {
            tracing::warn!(
                method = %req.method(),
                uri = %req.uri(),
                reason = %reason,
                "Bearer token rejected"
            );
        }
        IdentityResolution::Anonymous => {}
    }

    req.extensions_mut().insert(resolution);
    next.run(req).await
}

/// Extractor for the identity established by `resolve_identity`.
///
/// Only routes guarded by an authenticated policy should use it.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub ResolvedIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedIdentity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(|| {
                tracing::error!("No resolved identity on an authenticated route");
                ApiError::from(AccessDenied::Unauthenticated(
                    UnauthenticatedReason::MissingToken,
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use auth::Role;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::routing::get;
    use axum::Extension;
    use axum::Router;
    use chrono::Duration;
    use tower::ServiceExt;

    use super::*;

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::from_secret(b"middleware_test_secret_at_least_32_bytes", Duration::hours(1))
                .unwrap(),
        )
    }

    async fn echo_resolution(Extension(resolution): Extension<IdentityResolution>) -> String {
        match resolution {
            IdentityResolution::Anonymous => "anonymous".to_string(),
            IdentityResolution::Authenticated(identity) => {
                format!("authenticated:{}:{}", identity.subject, identity.role)
            }
            IdentityResolution::Rejected(reason) => format!("rejected:{}", reason),
        }
    }

    async fn whoami(CurrentIdentity(identity): CurrentIdentity) -> String {
        identity.subject
    }

    fn app(authenticator: Arc<Authenticator>) -> Router {
        Router::new()
            .route("/", get(echo_resolution))
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(authenticator, resolve_identity))
    }

    async fn call(app: Router, uri: &str, authorization: Option<&[u8]>) -> (StatusCode, String) {
        let mut request = http::Request::builder().uri(uri);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_no_header_is_anonymous() {
        let (status, body) = call(app(authenticator()), "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_valid_token_is_authenticated() {
        let authenticator = authenticator();
        let token = authenticator
            .issue("alice@example.com", Role::Admin, Utc::now())
            .unwrap()
            .access_token;
        let header = format!("Bearer {}", token);

        let (_, body) = call(app(authenticator), "/", Some(header.as_bytes())).await;
        assert_eq!(body, "authenticated:alice@example.com:ADMIN");
    }

    #[tokio::test]
    async fn test_bad_headers_are_rejected_not_refused() {
        let authenticator = authenticator();

        let headers: [&[u8]; 4] = [
            b"Bearer not.a.token",
            b"Basic dXNlcjpwYXNz",
            b"Bearer ",
            b"Bearer \xff\xfe",
        ];

        for header in headers {
            let (status, body) = call(app(Arc::clone(&authenticator)), "/", Some(header)).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.starts_with("rejected:"), "{:?} -> {}", header, body);
        }
    }

    #[tokio::test]
    async fn test_current_identity_requires_resolution() {
        let (status, _) = call(app(authenticator()), "/whoami", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
