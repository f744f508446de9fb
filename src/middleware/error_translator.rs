use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use serde_json::{json, Value};
use std::future::{ready, Ready};

use crate::config::ErrorMode;
use crate::utils::AppError;

/// Rewrites every error response into `{ success: false, message }`,
/// plus `error` and `stack` in verbose mode.
///
/// Catches handler errors, capability-check rejections and extractor
/// failures alike, since all of them carry their error on the response.
#[derive(Clone, Copy)]
pub struct ErrorTranslator {
    mode: ErrorMode,
}

impl ErrorTranslator {
    pub fn new(mode: ErrorMode) -> Self {
        Self { mode }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorTranslator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorTranslatorMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorTranslatorMiddleware {
            service,
            mode: self.mode,
        }))
    }
}

pub struct ErrorTranslatorMiddleware<S> {
    service: S,
    mode: ErrorMode,
}

impl<S, B> Service<ServiceRequest> for ErrorTranslatorMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        let mode = self.mode;

        Box::pin(async move {
            let res = fut.await?;
            let status = res.status();

            let body = match res.response().error() {
                Some(error) => render(mode, status, error),
                None => return Ok(res.map_into_left_body()),
            };

            if status.is_server_error() {
                log::error!("❌ {} {} -> {}: {}", res.request().method(), res.request().path(), status, body["message"]);
            }

            let (req, _) = res.into_parts();
            let response = HttpResponse::build(status).json(body);
            Ok(ServiceResponse::new(req, response).map_into_right_body())
        })
    }
}

fn render(mode: ErrorMode, status: StatusCode, error: &Error) -> Value {
    let app_error = error.as_error::<AppError>();

    let message = match (mode, app_error) {
        (ErrorMode::Terse, Some(e)) if !e.is_public() => "Internal Server Error".to_string(),
        (ErrorMode::Terse, None) if status.is_server_error() => "Internal Server Error".to_string(),
        (_, Some(e)) => e.to_string(),
        (_, None) => error.to_string(),
    };

    let mut body = json!({
        "success": false,
        "message": message,
    });

    if mode == ErrorMode::Verbose {
        let stack = match app_error {
            Some(e) => source_chain(e),
            None => vec![error.to_string()],
        };
        body["error"] = json!(format!("{:?}", error.as_response_error()));
        body["stack"] = json!(stack);
    }

    body
}

fn source_chain(error: &dyn std::error::Error) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut current = error.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    async fn fail_internal() -> Result<HttpResponse, AppError> {
        Err(AppError::Internal("pool exhausted".to_string()))
    }

    async fn fail_not_found() -> Result<HttpResponse, AppError> {
        Err(AppError::order_not_found())
    }

    async fn echo(body: web::Json<Value>) -> HttpResponse {
        HttpResponse::Ok().json(body.into_inner())
    }

    macro_rules! app {
        ($mode:expr) => {
            test::init_service(
                App::new()
                    .wrap(ErrorTranslator::new($mode))
                    .route("/internal", web::get().to(fail_internal))
                    .route("/missing", web::get().to(fail_not_found))
                    .route("/echo", web::post().to(echo)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_terse_hides_internal_errors() {
        let app = app!(ErrorMode::Terse);

        let req = test::TestRequest::get().uri("/internal").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({ "success": false, "message": "Internal Server Error" }));
    }

    #[actix_web::test]
    async fn test_terse_keeps_public_messages() {
        let app = app!(ErrorMode::Terse);

        let req = test::TestRequest::get().uri("/missing").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "No Order found with this ID");
        assert!(body.get("stack").is_none());
    }

    #[actix_web::test]
    async fn test_verbose_adds_error_and_stack() {
        let app = app!(ErrorMode::Verbose);

        let req = test::TestRequest::get().uri("/internal").to_request();
        let res = test::call_service(&app, req).await;

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "pool exhausted");
        assert!(body["error"].as_str().unwrap().contains("Internal"));
        assert_eq!(body["stack"][0], "pool exhausted");
    }

    #[actix_web::test]
    async fn test_extractor_errors_are_translated() {
        let app = app!(ErrorMode::Terse);

        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn test_success_passes_through() {
        let app = app!(ErrorMode::Terse);

        let req = test::TestRequest::post().uri("/echo").set_json(json!({ "a": 1 })).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "a": 1 }));
    }
}
