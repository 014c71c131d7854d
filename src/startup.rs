use actix_files as fs;
use actix_web::dev::Server;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{guard, web, App, HttpResponse, HttpServer};
use std::net::TcpListener;

use crate::auth::TokenService;
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::middleware::{CountHits, HitCounter};
use crate::routes::{
    create_chirp, create_user, delete_chirp, delete_user, get_chirp, handle_webhook, health_check,
    list_chirps, login, metrics, refresh, reset, revoke, update_user,
};
use crate::store::Store;

pub fn run(listener: TcpListener, store: Store, settings: Settings) -> Result<Server, std::io::Error> {
    let tokens = web::Data::new(TokenService::new(settings.jwt.clone(), store.clone()));
    let store = web::Data::new(store);
    let polka = web::Data::new(settings.polka.clone());
    let hits = web::Data::new(HitCounter::new());
    let static_dir = settings.application.static_dir.clone();

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS, PUT, DELETE"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            // Shared state
            .app_data(store.clone())
            .app_data(tokens.clone())
            .app_data(polka.clone())
            .app_data(hits.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::from(ValidationError::InvalidFormat(format!("request body ({})", err))).into()
            }))
            // CORS preflight for any path
            .service(
                web::resource("/{tail:.*}")
                    .guard(guard::Options())
                    .to(|| async { HttpResponse::Ok().finish() }),
            )
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/users", web::put().to(update_user))
                    .route("/users", web::delete().to(delete_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{id}", web::get().to(get_chirp))
                    .route("/chirps/{id}", web::delete().to(delete_chirp))
                    .route("/polka/webhooks", web::post().to(handle_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            .service(
                web::scope("/app")
                    .wrap(CountHits::new(hits.clone()))
                    .service(fs::Files::new("/", &static_dir).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
