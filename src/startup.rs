use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::configuration::JwtSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::middleware::JwtMiddleware;
use crate::repository::{ProductRepository, UserRepository};
use crate::routes::{
    create_product, delete_me, delete_product, get_me, get_product, get_user, health_check,
    list_products, list_users, root, sign_in, sign_up, update_me, update_product,
};
use crate::services::UserService;

/// Everything the server needs besides the listener
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub jwt: JwtSettings,
}

fn malformed_request(err: impl std::fmt::Display, _req: &HttpRequest) -> actix_web::Error {
    AppError::from(ValidationError::MalformedRequest(err.to_string())).into()
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let issuer = TokenIssuer::new(state.jwt);
    let user_service = web::Data::new(UserService::new(state.users, issuer.clone()));
    let products: web::Data<dyn ProductRepository> = web::Data::from(state.products);

    let server = HttpServer::new(move || {
        App::new()
            // Last wrap runs first: access log, request timing, then authentication
            .wrap(JwtMiddleware::new(issuer.clone()))
            .wrap(RequestLogger)
            .wrap(Logger::default())

            // Shared state
            .app_data(user_service.clone())
            .app_data(products.clone())
            .app_data(web::JsonConfig::default().error_handler(malformed_request))
            .app_data(web::QueryConfig::default().error_handler(malformed_request))
            .app_data(web::PathConfig::default().error_handler(malformed_request))

            .route("/", web::get().to(root))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/users")
                    .route("", web::get().to(list_users))
                    .route("/sign-up", web::post().to(sign_up))
                    .route("/sign-in", web::post().to(sign_in))
                    .service(
                        web::resource("/me")
                            .route(web::get().to(get_me))
                            .route(web::patch().to(update_me))
                            .route(web::delete().to(delete_me)),
                    )
                    .route("/{user_id}", web::get().to(get_user)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(list_products))
                    .route("", web::post().to(create_product))
                    .service(
                        web::resource("/{product_id}")
                            .route(web::get().to(get_product))
                            .route(web::patch().to(update_product))
                            .route(web::delete().to(delete_product)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
