use mongodb::bson::oid::ObjectId;

use crate::models::{CreateProductRequest, Product, ProductPage, ProductQuery, UpdateProductRequest};
use crate::state::AppState;
use crate::utils::{now_millis, AppError};

pub async fn search(state: &AppState, query: &ProductQuery) -> Result<ProductPage, AppError> {
    state.products.find(query).await
}

pub async fn get_product(state: &AppState, id: &str) -> Result<Product, AppError> {
    state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(AppError::product_not_found)
}

/// `seller` defaults to the creating admin's name.
pub async fn create_product(
    state: &AppState,
    request: CreateProductRequest,
    admin_name: &str,
) -> Result<Product, AppError> {
    let seller = if request.seller.trim().is_empty() {
        admin_name.to_string()
    } else {
        request.seller
    };

    let product = Product {
        id: ObjectId::new().to_hex(),
        name: request.name,
        description: request.description,
        price: request.price,
        stock: request.stock,
        ratings: 0.0,
        num_of_reviews: 0,
        category: request.category,
        seller,
        created_at: now_millis(),
    };
    product.validate().map_err(AppError::Validation)?;

    let product = state.products.create(product).await?;
    log::info!("✅ Product created: {} ({})", product.name, product.id);
    Ok(product)
}

pub async fn update_product(
    state: &AppState,
    id: &str,
    request: UpdateProductRequest,
) -> Result<Product, AppError> {
    let mut product = get_product(state, id).await?;
    request.apply(&mut product);
    product.validate().map_err(AppError::Validation)?;

    if !state.products.save(&product).await? {
        return Err(AppError::product_not_found());
    }
    Ok(product)
}

pub async fn delete_product(state: &AppState, id: &str) -> Result<(), AppError> {
    if !state.products.delete(id).await? {
        return Err(AppError::product_not_found());
    }
    log::info!("🗑️ Product {} deleted", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_state, TestHarness};

    fn create_request(name: &str, stock: i64) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            description: "A product".to_string(),
            price: 25.0,
            stock,
            category: "Electronics".to_string(),
            seller: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_product_defaults_seller() {
        let TestHarness { state, products, .. } = test_state();

        let product = create_product(&state, create_request("Camera", 5), "Admin").await.unwrap();

        assert_eq!(product.seller, "Admin");
        assert_eq!(products.stock_of(&product.id), Some(5));
    }

    #[tokio::test]
    async fn test_create_product_rejects_unknown_category() {
        let TestHarness { state, .. } = test_state();
        let mut request = create_request("Camera", 5);
        request.category = "Toys".to_string();

        let result = create_product(&state, request, "Admin").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_product_validates_before_saving() {
        let TestHarness { state, products, .. } = test_state();
        let product = create_product(&state, create_request("Camera", 5), "Admin").await.unwrap();

        let negative = UpdateProductRequest { stock: Some(-1), ..Default::default() };
        assert!(matches!(
            update_product(&state, &product.id, negative).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(products.stock_of(&product.id), Some(5));

        let restock = UpdateProductRequest { stock: Some(12), ..Default::default() };
        let updated = update_product(&state, &product.id, restock).await.unwrap();
        assert_eq!(updated.stock, 12);
        assert_eq!(products.stock_of(&product.id), Some(12));
    }

    #[tokio::test]
    async fn test_search_filters_and_paginates() {
        let TestHarness { state, .. } = test_state();
        for i in 0..10 {
            create_product(&state, create_request(&format!("Camera {}", i), 1), "Admin").await.unwrap();
        }
        let mut book = create_request("Rust Book", 3);
        book.category = "Books".to_string();
        create_product(&state, book, "Admin").await.unwrap();

        let query = ProductQuery { keyword: Some("camera".to_string()), page: Some(2), ..Default::default() };
        let page = search(&state, &query).await.unwrap();

        assert_eq!(page.products_count, 11);
        assert_eq!(page.filtered_products_count, 10);
        assert_eq!(page.res_per_page, 8);
        assert_eq!(page.products.len(), 2);
    }

    #[tokio::test]
    async fn test_search_pages_in_id_order() {
        let TestHarness { state, .. } = test_state();
        for id in ["64b7f0c2a1b2c3d4e5f60719", "64b7f0c2a1b2c3d4e5f60717", "64b7f0c2a1b2c3d4e5f60718"] {
            let mut product = create_product(&state, create_request("Camera", 1), "Admin").await.unwrap();
            state.products.delete(&product.id).await.unwrap();
            product.id = id.to_string();
            state.products.create(product).await.unwrap();
        }

        let page = search(&state, &ProductQuery::default()).await.unwrap();
        let ids: Vec<&str> = page.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["64b7f0c2a1b2c3d4e5f60717", "64b7f0c2a1b2c3d4e5f60718", "64b7f0c2a1b2c3d4e5f60719"]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let TestHarness { state, .. } = test_state();
        assert!(matches!(
            delete_product(&state, "missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
