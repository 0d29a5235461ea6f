use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{debug, warn};
use std::sync::Arc;

use super::gate::authorize;
use super::token::TokenCodec;
use crate::error::AppError;

/// Authorization gate for a protected scope.
///
/// Every request passing through must carry `Authorization: Bearer <token>`
/// with a token the codec accepts. Admitted requests get an
/// [`AuthenticatedUser`](super::AuthenticatedUser) in their extensions;
/// rejected ones are answered with 401 and never reach the wrapped service.
pub struct AuthMiddleware {
    codec: Arc<TokenCodec>,
}

impl AuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            codec: Arc::clone(&self.codec),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authorize(req.headers().get(header::AUTHORIZATION), &self.codec) {
            Ok(user) => {
                debug!("{} {} admitted for user {}", req.method(), req.path(), user.id());
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejection) => {
                // The caller only ever sees a generic 401; the precise cause stays in the log.
                warn!("{} {} rejected: {}", req.method(), req.path(), rejection);
                let response = AppError::from(rejection).error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::config::AuthConfig;
    use crate::models::UserId;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(&AuthConfig {
            jwt_secret: "middleware-test-secret".to_string(),
            token_ttl: chrono::Duration::hours(1),
        }))
    }

    async fn whoami(user: AuthenticatedUser, hits: web::Data<AtomicUsize>) -> HttpResponse {
        hits.fetch_add(1, Ordering::SeqCst);
        HttpResponse::Ok().body(user.id().to_string())
    }

    #[actix_rt::test]
    async fn test_gate_admits_and_rejects() {
        let codec = codec();
        let hits = web::Data::new(AtomicUsize::new(0));
        let app = test::init_service(
            App::new().app_data(hits.clone()).service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(codec.clone()))
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await;

        let token = codec.issue(UserId(77)).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "77");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        for header_value in [None, Some("Bearer garbage"), Some("Basic dXNlcjpwYXNz")] {
            let mut req = test::TestRequest::get().uri("/api/whoami");
            if let Some(value) = header_value {
                req = req.insert_header((header::AUTHORIZATION, value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(
                resp.status(),
                StatusCode::UNAUTHORIZED,
                "{:?} should be rejected",
                header_value
            );
        }
        // Downstream handler never ran for the rejected requests.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
