use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::activity::StopActivity;
use crate::models::stop::Stop;
use crate::models::trip::Trip;
use crate::services::clone_service::build_trip_copy;
use crate::services::ownership_service::authorize_trip;
use crate::services::sharing_service::toggle_sharing;

#[derive(Debug, Deserialize)]
pub struct TripCreate {
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub cover_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TripUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub cover_photo: Option<String>,
}

pub async fn create_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    input: web::Json<TripCreate>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");

    let input = input.into_inner();
    if input.start_date >= input.end_date {
        return Err(ApiError::Validation(
            "End date must be after start date".to_string(),
        ));
    }

    let now = Utc::now();
    let mut trip = Trip {
        id: None,
        user_id: user.user_id,
        name: input.name,
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
        cover_photo: input.cover_photo,
        is_public: false,
        share_token: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = collection.insert_one(&trip).await?;
    trip.id = result.inserted_id.as_object_id();

    Ok(HttpResponse::Created().json(trip))
}

pub async fn get_all_trips(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");

    let trips = collection
        .find(doc! { "user_id": user.user_id })
        .sort(doc! { "created_at": -1 })
        .await?
        .try_collect::<Vec<Trip>>()
        .await?;

    Ok(HttpResponse::Ok().json(trips))
}

pub async fn get_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let trip = authorize_trip(&client, user.user_id, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(trip))
}

pub async fn update_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<TripUpdate>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let mut trip = authorize_trip(&client, user.user_id, &path.into_inner()).await?;

    let input = input.into_inner();

    // Revalidate the merged range, not just the provided fields.
    let start = input.start_date.unwrap_or(trip.start_date);
    let end = input.end_date.unwrap_or(trip.end_date);
    if start >= end {
        return Err(ApiError::Validation(
            "End date must be after start date".to_string(),
        ));
    }

    if let Some(name) = input.name {
        trip.name = name;
    }
    if let Some(description) = input.description {
        trip.description = Some(description);
    }
    if let Some(cover_photo) = input.cover_photo {
        trip.cover_photo = Some(cover_photo);
    }
    trip.start_date = start;
    trip.end_date = end;
    trip.updated_at = Some(Utc::now());

    let collection: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");
    collection
        .replace_one(doc! { "_id": trip.id }, &trip)
        .await?;

    Ok(HttpResponse::Ok().json(trip))
}

pub async fn delete_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let trip = authorize_trip(&client, user.user_id, &path.into_inner()).await?;
    let trip_id = trip.id.ok_or_else(|| ApiError::not_found("Trip"))?;

    let db = client.database(DB_NAME);
    let stops: mongodb::Collection<Stop> = db.collection("Stops");
    let links: mongodb::Collection<StopActivity> = db.collection("StopActivities");
    let trips: mongodb::Collection<Trip> = db.collection("Trips");

    // Explicit cascade: links, then stops, then the trip.
    let stop_ids: Vec<ObjectId> = stops
        .find(doc! { "trip_id": trip_id })
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
    stops.delete_many(doc! { "trip_id": trip_id }).await?;
    trips.delete_one(doc! { "_id": trip_id }).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Public lookup by share token, no authentication. Unknown tokens read as
/// missing; a known token on a re-privatized trip reads as forbidden, so the
/// frontend can tell "bad link" from "owner turned sharing off".
pub async fn get_shared_trip(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");

    let trip = collection
        .find_one(doc! { "share_token": path.into_inner() })
        .await?
        .ok_or_else(|| ApiError::NotFound("Trip not found or invalid token".to_string()))?;

    if !trip.is_public {
        return Err(ApiError::Forbidden(
            "This trip is currently private".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(trip))
}

pub async fn toggle_trip_sharing(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let mut trip = authorize_trip(&client, user.user_id, &path.into_inner()).await?;

    let (is_public, share_token) = toggle_sharing(trip.is_public, trip.share_token.take());
    trip.is_public = is_public;
    trip.share_token = share_token;
    trip.updated_at = Some(Utc::now());

    let collection: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");
    collection
        .replace_one(doc! { "_id": trip.id }, &trip)
        .await?;

    Ok(HttpResponse::Ok().json(trip))
}

/// Clones a trip (stops and activity links included) into the caller's
/// account. Writes go trip first, then stops, then links, so an interrupted
/// clone can never leave a stop without its trip or a link without its stop.
pub async fn copy_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let db = client.database(DB_NAME);
    let trips: mongodb::Collection<Trip> = db.collection("Trips");
    let stops: mongodb::Collection<Stop> = db.collection("Stops");
    let links: mongodb::Collection<StopActivity> = db.collection("StopActivities");

    let trip_id = ObjectId::parse_str(&path.into_inner()).map_err(|_| ApiError::not_found("Trip"))?;

    let source = trips
        .find_one(doc! { "_id": trip_id })
        .await?
        .ok_or_else(|| ApiError::not_found("Trip"))?;

    if !source.is_public && source.user_id != user.user_id {
        return Err(ApiError::Forbidden("Cannot copy private trip".to_string()));
    }

    let source_stops = stops
        .find(doc! { "trip_id": trip_id })
        .sort(doc! { "order": 1 })
        .await?
        .try_collect::<Vec<Stop>>()
        .await?;

    let mut stops_with_links = Vec::with_capacity(source_stops.len());
    for stop in source_stops {
        let stop_links = match stop.id {
            Some(stop_id) => {
                links
                    .find(doc! { "stop_id": stop_id })
                    .await?
                    .try_collect::<Vec<StopActivity>>()
                    .await?
            }
            None => Vec::new(),
        };
        stops_with_links.push((stop, stop_links));
    }

    let copy = build_trip_copy(&source, &stops_with_links, user.user_id);

    trips.insert_one(&copy.trip).await?;
    if !copy.stops.is_empty() {
        stops.insert_many(&copy.stops).await?;
    }
    if !copy.stop_activities.is_empty() {
        links.insert_many(&copy.stop_activities).await?;
    }

    log::info!(
        "cloned trip {} into {} ({} stops, {} activities)",
        trip_id,
        copy.trip.id.unwrap_or_default(),
        copy.stops.len(),
        copy.stop_activities.len()
    );

    Ok(HttpResponse::Created().json(copy.trip))
}
