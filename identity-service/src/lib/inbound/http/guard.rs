use std::sync::Arc;

use auth::authorize;
use auth::IdentityResolution;
use auth::RoutePolicy;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::MethodRouter;

use super::handlers::ApiError;

/// Attach an access policy to a route.
///
/// The policy is evaluated before the handler runs, against the
/// `IdentityResolution` left by `resolve_identity`. A request that never
/// went through resolution counts as anonymous. Methods the route does not
/// serve still answer 405.
pub fn guarded<S>(policy: RoutePolicy, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(
        Arc::new(policy),
        enforce_policy,
    ))
}

async fn enforce_policy(
    State(policy): State<Arc<RoutePolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let decision = match req.extensions().get::<IdentityResolution>() {
        Some(resolution) => authorize(&policy, resolution),
        None => authorize(&policy, &IdentityResolution::Anonymous),
    };

    match decision {
        Ok(()) => next.run(req).await,
        Err(denied) => {
            tracing::debug!(uri = %req.uri(), "Access denied: {}", denied);
            ApiError::from(denied).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use auth::ResolvedIdentity;
    use auth::Role;
    use auth::ValidationFailure;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    async fn ok() -> &'static str {
        "ok"
    }

    fn app(policy: RoutePolicy, resolution: Option<IdentityResolution>) -> Router {
        let router = Router::new().route("/", guarded(policy, get(ok)));
        match resolution {
            Some(resolution) => router.layer(axum::Extension(resolution)),
            None => router,
        }
    }

    async fn status(policy: RoutePolicy, resolution: Option<IdentityResolution>) -> StatusCode {
        status_for(http::Method::GET, policy, resolution).await
    }

    async fn status_for(
        method: http::Method,
        policy: RoutePolicy,
        resolution: Option<IdentityResolution>,
    ) -> StatusCode {
        app(policy, resolution)
            .oneshot(
                http::Request::builder()
                    .method(method)
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    fn authenticated(role: Role) -> Option<IdentityResolution> {
        Some(IdentityResolution::Authenticated(ResolvedIdentity {
            subject: "someone@example.com".to_string(),
            role,
        }))
    }

    #[tokio::test]
    async fn test_public_route_ignores_identity() {
        assert_eq!(status(RoutePolicy::Public, None).await, StatusCode::OK);
        assert_eq!(
            status(
                RoutePolicy::Public,
                Some(IdentityResolution::Rejected(ValidationFailure::Expired))
            )
            .await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_admin_route_decisions() {
        let admin = || RoutePolicy::requires([Role::Admin]);

        assert_eq!(status(admin(), None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(admin(), Some(IdentityResolution::Anonymous)).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(
                admin(),
                Some(IdentityResolution::Rejected(ValidationFailure::InvalidSignature))
            )
            .await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(admin(), authenticated(Role::Standard)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(status(admin(), authenticated(Role::Admin)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_any_authenticated_admits_every_role() {
        for role in Role::ALL {
            assert_eq!(
                status(RoutePolicy::AnyAuthenticated, authenticated(role)).await,
                StatusCode::OK
            );
        }
        assert_eq!(
            status(RoutePolicy::AnyAuthenticated, None).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_unserved_method_is_not_allowed_before_policy() {
        let admin = || RoutePolicy::requires([Role::Admin]);

        assert_eq!(
            status_for(http::Method::POST, admin(), None).await,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            status_for(
                http::Method::DELETE,
                RoutePolicy::AnyAuthenticated,
                authenticated(Role::Standard)
            )
            .await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
