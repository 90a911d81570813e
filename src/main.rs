use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Utc;
use env_logger::Env;
use mongodb::bson::doc;
use mongodb::Client;

use globetrotter_api::db;
use globetrotter_api::middleware::auth::AuthMiddleware;
use globetrotter_api::models::user::{User, UserRole};
use globetrotter_api::routes;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

/// Creates the default admin account on first boot so the admin endpoints are
/// reachable on a fresh database.
async fn ensure_admin_user(client: &Client) -> mongodb::error::Result<()> {
    let users: mongodb::Collection<User> = client.database(db::mongo::DB_NAME).collection("Users");

    if users.find_one(doc! { "role": "admin" }).await?.is_some() {
        log::info!("Admin user already exists");
        return Ok(());
    }

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let hashed = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .expect("Failed to hash default admin password");

    let now = Utc::now();
    let admin = User {
        id: None,
        email: "admin@globetrotter.com".to_string(),
        username: "admin".to_string(),
        password: hashed,
        full_name: Some("System Admin".to_string()),
        profile_picture: None,
        role: UserRole::Admin,
        is_verified: true,
        created_at: Some(now),
        updated_at: Some(now),
    };
    users.insert_one(&admin).await?;

    log::info!("Admin user created: admin@globetrotter.com");
    log::warn!("Default admin password in use; change it in production!");
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;

    if let Err(err) = db::mongo::ensure_indexes(&client).await {
        log::warn!("Failed to create indexes: {}", err);
    }
    if let Err(err) = ensure_admin_user(&client).await {
        log::warn!("Failed to bootstrap admin user: {}", err);
    }

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_origin("http://localhost:3001")
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials(),
            )
            .app_data(web::Data::new(client.clone()))
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(routes::auth::register))
                    .route("/login", web::post().to(routes::auth::login))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware)
                            .route("/me", web::get().to(routes::auth::me)),
                    ),
            )
            .service(
                web::scope("/users")
                    .wrap(AuthMiddleware)
                    .route("/profile", web::get().to(routes::user::get_profile))
                    .route("/profile", web::put().to(routes::user::update_profile))
                    .route("/profile", web::delete().to(routes::user::delete_profile)),
            )
            .service(
                web::scope("/cities")
                    .route("", web::get().to(routes::city::search_cities))
                    .route("/popular", web::get().to(routes::city::get_popular_cities))
                    .route("/{city_id}", web::get().to(routes::city::get_city)),
            )
            .service(
                web::scope("/trips")
                    // Public share lookup stays outside the auth wrap.
                    .route(
                        "/share/{share_token}",
                        web::get().to(routes::trip::get_shared_trip),
                    )
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware)
                            .route("", web::post().to(routes::trip::create_trip))
                            .route("", web::get().to(routes::trip::get_all_trips))
                            .route("/{trip_id}", web::get().to(routes::trip::get_trip))
                            .route("/{trip_id}", web::put().to(routes::trip::update_trip))
                            .route("/{trip_id}", web::delete().to(routes::trip::delete_trip))
                            .route(
                                "/{trip_id}/share",
                                web::put().to(routes::trip::toggle_trip_sharing),
                            )
                            .route("/{trip_id}/copy", web::post().to(routes::trip::copy_trip))
                            .route(
                                "/{trip_id}/stops",
                                web::post().to(routes::stop::add_stop_to_trip),
                            )
                            .route(
                                "/{trip_id}/stops",
                                web::get().to(routes::stop::get_trip_stops),
                            ),
                    ),
            )
            .service(
                web::scope("/stops")
                    .wrap(AuthMiddleware)
                    .route("/{stop_id}", web::get().to(routes::stop::get_stop))
                    .route("/{stop_id}", web::put().to(routes::stop::update_stop))
                    .route("/{stop_id}", web::delete().to(routes::stop::delete_stop)),
            )
            .service(
                web::scope("/activities")
                    .route("", web::get().to(routes::activity::search_activities))
                    .service(
                        web::scope("/stop")
                            .wrap(AuthMiddleware)
                            .route(
                                "/{stop_id}",
                                web::get().to(routes::activity::get_stop_activities),
                            )
                            .route(
                                "/{stop_id}",
                                web::post().to(routes::activity::add_activity_to_stop),
                            )
                            .route(
                                "/{stop_id}/{activity_id}",
                                web::delete().to(routes::activity::remove_activity_from_stop),
                            ),
                    ),
            )
            .service(
                web::scope("/budget")
                    .wrap(AuthMiddleware)
                    .route("/{trip_id}", web::get().to(routes::budget::get_trip_budget)),
            )
            .configure(routes::admin::config)
    })
    .bind((host, port))?
    .run()
    .await
}
