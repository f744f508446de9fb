pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod swagger;
pub mod users;

use actix_web::web;

use crate::middleware::AuthMiddleware;
use crate::models::Role;

/// Mounts every `/api/v1` route. Shared by `main` and the route tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Public
            .route("/signup", web::post().to(auth::signup))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::get().to(auth::logout))
            .route("/password/forgot", web::post().to(auth::forgot_password))
            .route("/password/reset/{token}", web::put().to(auth::reset_password))
            .route("/products", web::get().to(products::get_products))
            .route("/product/{id}", web::get().to(products::get_product))
            // Any logged-in user
            .service(
                web::resource("/me")
                    .wrap(AuthMiddleware::authenticated())
                    .route(web::get().to(auth::me)),
            )
            .service(
                web::resource("/me/update")
                    .wrap(AuthMiddleware::authenticated())
                    .route(web::put().to(auth::update_profile)),
            )
            .service(
                web::resource("/password/update")
                    .wrap(AuthMiddleware::authenticated())
                    .route(web::put().to(auth::update_password)),
            )
            .service(
                web::resource("/order/new")
                    .wrap(AuthMiddleware::authenticated())
                    .route(web::post().to(orders::new_order)),
            )
            .service(
                web::resource("/orders/me")
                    .wrap(AuthMiddleware::authenticated())
                    .route(web::get().to(orders::my_orders)),
            )
            // Owner or admin, checked by the workflow
            .service(
                web::resource("/order/{id}")
                    .wrap(AuthMiddleware::authenticated())
                    .route(web::get().to(orders::get_order)),
            )
            // Admin only
            .service(
                web::scope("/admin")
                    .wrap(AuthMiddleware::require(Role::Admin))
                    .route("/users", web::get().to(users::list_users))
                    .service(
                        web::resource("/user/{id}")
                            .route(web::get().to(users::get_user))
                            .route(web::put().to(users::update_user))
                            .route(web::delete().to(users::delete_user)),
                    )
                    .route("/product/new", web::post().to(products::create_product))
                    .service(
                        web::resource("/product/{id}")
                            .route(web::put().to(products::update_product))
                            .route(web::delete().to(products::delete_product)),
                    )
                    .route("/orders", web::get().to(orders::all_orders))
                    .service(
                        web::resource("/order/{id}")
                            .route(web::put().to(orders::update_order))
                            .route(web::delete().to(orders::delete_order)),
                    ),
            ),
    );
}
