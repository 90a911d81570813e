use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::activity::StopActivity;
use crate::models::stop::Stop;
use crate::models::trip::Trip;
use crate::models::user::{User, UserProfile};

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub profile_picture: Option<String>,
}

pub async fn get_profile(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DB_NAME).collection("Users");

    let record = collection
        .find_one(doc! { "_id": user.user_id })
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(record)))
}

pub async fn update_profile(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    input: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DB_NAME).collection("Users");

    let mut record = collection
        .find_one(doc! { "_id": user.user_id })
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let input = input.into_inner();
    if let Some(full_name) = input.full_name {
        record.full_name = Some(full_name);
    }
    if let Some(profile_picture) = input.profile_picture {
        record.profile_picture = Some(profile_picture);
    }
    record.updated_at = Some(Utc::now());

    collection
        .replace_one(doc! { "_id": user.user_id }, &record)
        .await?;

    Ok(HttpResponse::Ok().json(UserProfile::from(record)))
}

/// Deletes the account and everything it transitively owns. MongoDB has no
/// declarative cascades, so the chain runs bottom-up by hand: activity links,
/// then stops, then trips, then the user itself.
pub async fn delete_profile(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let db = client.database(DB_NAME);

    let trips: mongodb::Collection<Trip> = db.collection("Trips");
    let stops: mongodb::Collection<Stop> = db.collection("Stops");
    let links: mongodb::Collection<StopActivity> = db.collection("StopActivities");
    let users: mongodb::Collection<User> = db.collection("Users");

    let trip_ids: Vec<ObjectId> = trips
        .find(doc! { "user_id": user.user_id })
        .await?
        .try_collect::<Vec<Trip>>()
        .await?
        .into_iter()
        .filter_map(|t| t.id)
        .collect();

    if !trip_ids.is_empty() {
        let stop_ids: Vec<ObjectId> = stops
            .find(doc! { "trip_id": { "$in": trip_ids.clone() } })
            .await?
            .try_collect::<Vec<Stop>>()
            .await?
            .into_iter()
            .filter_map(|s| s.id)
            .collect();

        if !stop_ids.is_empty() {
            links
                .delete_many(doc! { "stop_id": { "$in": stop_ids } })
                .await?;
        }
        stops
            .delete_many(doc! { "trip_id": { "$in": trip_ids } })
            .await?;
        trips.delete_many(doc! { "user_id": user.user_id }).await?;
    }

    users.delete_one(doc! { "_id": user.user_id }).await?;

    log::info!("deleted account {}", user.email);
    Ok(HttpResponse::Ok().json(json!({ "message": "User account deleted successfully" })))
}
