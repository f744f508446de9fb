use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::models::{Role, Secrets};
use crate::state::AppState;
use crate::utils::AppError;

pub const TOKEN_COOKIE: &str = "token";

/// The authenticated caller, inserted into request extensions.
/// Handlers read it with `web::ReqData<AuthUser>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Capability check: a valid token is always required, and `required`
/// additionally restricts the scope to one role.
#[derive(Clone, Copy)]
pub struct AuthMiddleware {
    required: Option<Role>,
}

impl AuthMiddleware {
    pub fn authenticated() -> Self {
        Self { required: None }
    }

    pub fn require(role: Role) -> Self {
        Self { required: Some(role) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    required: Option<Role>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required;

        Box::pin(async move {
            let outcome = authenticate(&req, required).await;
            match outcome {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                    Ok(req.error_response(e).map_into_right_body())
                }
            }
        })
    }
}

/// Bearer header first, then the `token` cookie.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        req.cookie(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

async fn authenticate(req: &ServiceRequest, required: Option<Role>) -> Result<AuthUser, AppError> {
    let login_first = || AppError::Unauthorized("Login first to access this resource.".to_string());

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;

    let token = extract_token(req).ok_or_else(login_first)?;
    let user_id = state.credentials.verify_token(&token)?;

    // Token outlived its account
    let user = state
        .users
        .find_by_id(&user_id, Secrets::Exclude)
        .await?
        .ok_or_else(login_first)?;

    if let Some(role) = required {
        if user.role != role {
            return Err(AppError::Forbidden(format!(
                "Role ({}) is not allowed to access this resource",
                user.role
            )));
        }
    }

    Ok(AuthUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    })
}
