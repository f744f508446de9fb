use actix_web::{web, HttpResponse};

use crate::middleware::AuthUser;
use crate::models::{NewOrderRequest, OrderStatus, UpdateOrderStatusRequest};
use crate::state::AppState;
use crate::utils::{parse_object_id, AppError};

#[utoipa::path(
    post,
    path = "/api/v1/order/new",
    tag = "Orders",
    request_body = NewOrderRequest,
    responses(
        (status = 200, description = "Order placed"),
        (status = 400, description = "Invalid order")
    ),
    security(("bearer_auth" = []))
)]
pub async fn new_order(
    state: web::Data<AppState>,
    caller: web::ReqData<AuthUser>,
    request: web::Json<NewOrderRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "🛒 POST /order/new - user: {}, items: {}",
        caller.id,
        request.order_items.len()
    );

    let order = state.workflow.create_order(request.into_inner(), &caller.id).await?;

    log::info!("✅ Order {} placed ({:.2})", order.id, order.total_price);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "order": order
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/order/{id}",
    tag = "Orders",
    params(("id" = String, Path, description = "Order ObjectId")),
    responses(
        (status = 200, description = "Order with owner name and email"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "No order with this id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    state: web::Data<AppState>,
    caller: web::ReqData<AuthUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    let order = state.workflow.get_order(&id, &caller).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "order": order
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/me",
    tag = "Orders",
    responses((status = 200, description = "Orders placed by the caller")),
    security(("bearer_auth" = []))
)]
pub async fn my_orders(
    state: web::Data<AppState>,
    caller: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let orders = state.workflow.list_orders_of(&caller.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "orders": orders
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    tag = "Admin",
    responses((status = 200, description = "All orders and the sum of their totals")),
    security(("bearer_auth" = []))
)]
pub async fn all_orders(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let (orders, total_amount) = state.workflow.list_all_orders_with_total().await?;

    log::info!("📊 GET /admin/orders - {} orders, total {:.2}", orders.len(), total_amount);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "totalAmount": total_amount,
        "orders": orders
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/order/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Order ObjectId")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed and stock decremented"),
        (status = 400, description = "Already delivered or insufficient stock"),
        (status = 404, description = "Order or product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    let status = OrderStatus::from(request.into_inner().status);
    log::info!("🚚 PUT /admin/order/{} -> {}", id, status.as_str());

    state.workflow.advance_status(&id, status).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/order/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Order ObjectId")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "No order with this id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    log::info!("🗑️ DELETE /admin/order/{}", id);

    state.workflow.delete_order(&id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
