use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireRole;
use crate::models::city::City;
use crate::models::trip::Trip;
use crate::models::user::{User, UserProfile, UserRole};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(AuthMiddleware)
            .route("/analytics", web::get().to(get_analytics))
            .route("/users", web::get().to(get_all_users))
            .route("/trips", web::get().to(get_all_trips)),
    );
}

/// Admin dashboard aggregates: user and trip totals, the ten most visited
/// cities, the ten most recent trips.
pub async fn get_analytics(data: web::Data<Arc<Client>>) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let db = client.database(DB_NAME);

    let users: mongodb::Collection<User> = db.collection("Users");
    let trips: mongodb::Collection<Trip> = db.collection("Trips");
    let cities: mongodb::Collection<City> = db.collection("Cities");
    let stops: mongodb::Collection<Document> = db.collection("Stops");

    let total_users = users.count_documents(doc! {}).await?;
    let verified_users = users.count_documents(doc! { "is_verified": true }).await?;
    let total_trips = trips.count_documents(doc! {}).await?;
    let public_trips = trips.count_documents(doc! { "is_public": true }).await?;

    // Most visited cities: group stops by city, count, resolve names.
    let pipeline = vec![
        doc! { "$group": { "_id": "$city_id", "visits": { "$sum": 1 } } },
        doc! { "$sort": { "visits": -1 } },
        doc! { "$limit": 10 },
    ];
    let stats = stops
        .aggregate(pipeline)
        .await?
        .try_collect::<Vec<Document>>()
        .await?;

    let mut popular_cities = Vec::with_capacity(stats.len());
    for stat in stats {
        let city_id = match stat.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => continue,
        };
        let visits = stat
            .get_i32("visits")
            .map(i64::from)
            .or_else(|_| stat.get_i64("visits"))
            .unwrap_or(0);
        if let Some(city) = cities.find_one(doc! { "_id": city_id }).await? {
            popular_cities.push(json!({
                "name": city.name,
                "country": city.country,
                "visits": visits,
            }));
        }
    }

    let recent = trips
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .limit(10)
        .await?
        .try_collect::<Vec<Trip>>()
        .await?;
    let recent_trips: Vec<_> = recent
        .into_iter()
        .map(|trip| {
            json!({
                "id": trip.id.map(|id| id.to_hex()),
                "name": trip.name,
                "user_id": trip.user_id.to_hex(),
                "created_at": trip.created_at,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "users": {
            "total": total_users,
            "verified": verified_users,
            "unverified": total_users - verified_users,
        },
        "trips": {
            "total": total_trips,
            "public": public_trips,
            "private": total_trips - public_trips,
        },
        "popular_cities": popular_cities,
        "recent_trips": recent_trips,
    })))
}

pub async fn get_all_users(data: web::Data<Arc<Client>>) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let users: mongodb::Collection<User> = client.database(DB_NAME).collection("Users");

    let all = users
        .find(doc! {})
        .await?
        .try_collect::<Vec<User>>()
        .await?;
    let profiles: Vec<UserProfile> = all.into_iter().map(UserProfile::from).collect();

    Ok(HttpResponse::Ok().json(profiles))
}

pub async fn get_all_trips(data: web::Data<Arc<Client>>) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let trips: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");

    let all = trips
        .find(doc! {})
        .await?
        .try_collect::<Vec<Trip>>()
        .await?;

    Ok(HttpResponse::Ok().json(all))
}
