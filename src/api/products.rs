use actix_web::{web, HttpResponse};

use crate::middleware::AuthUser;
use crate::models::{CreateProductRequest, ProductQuery, UpdateProductRequest};
use crate::services::catalog_service;
use crate::state::AppState;
use crate::utils::{parse_object_id, AppError};

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    params(
        ("keyword" = Option<String>, Query, description = "Case-insensitive name match"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("price[gte]" = Option<f64>, Query, description = "Minimum price"),
        ("price[lte]" = Option<f64>, Query, description = "Maximum price"),
        ("ratings[gte]" = Option<f64>, Query, description = "Minimum rating"),
        ("page" = Option<u64>, Query, description = "1-based page number, 8 per page")
    ),
    responses((status = 200, description = "Filtered, paginated catalog"))
)]
pub async fn get_products(
    state: web::Data<AppState>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
    let page = catalog_service::search(&state, &query).await?;

    log::debug!(
        "📦 GET /products - page {} ({} of {} matched)",
        query.page(),
        page.filtered_products_count,
        page.products_count
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "products": page.products,
        "productsCount": page.products_count,
        "filteredProductsCount": page.filtered_products_count,
        "resPerPage": page.res_per_page
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/product/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ObjectId")),
    responses(
        (status = 200, description = "Product"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    let product = catalog_service::get_product(&state, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "product": product
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/product/new",
    tag = "Admin",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Invalid product")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    state: web::Data<AppState>,
    caller: web::ReqData<AuthUser>,
    request: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("➕ POST /admin/product/new - by {}", caller.email);

    let product = catalog_service::create_product(&state, request.into_inner(), &caller.name).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "product": product
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/product/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Product ObjectId")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    log::info!("✏️ PUT /admin/product/{}", id);

    let product = catalog_service::update_product(&state, &id, request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "product": product
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/product/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "Product ObjectId")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    log::info!("🗑️ DELETE /admin/product/{}", id);

    catalog_service::delete_product(&state, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Product is deleted."
    })))
}
