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
use crate::models::city::City;
use crate::models::stop::{Stop, StopWithCity};
use crate::services::ownership_service::{authorize_stop, authorize_trip};

#[derive(Debug, Deserialize)]
pub struct StopCreate {
    pub city_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub transport_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StopUpdate {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub order: Option<i32>,
}

async fn find_city(client: &Client, city_id: ObjectId) -> Result<City, ApiError> {
    let cities: mongodb::Collection<City> = client.database(DB_NAME).collection("Cities");
    cities
        .find_one(doc! { "_id": city_id })
        .await?
        .ok_or_else(|| ApiError::not_found("City"))
}

/// Adds a city stop to a trip. The stop takes the next order slot
/// (count of existing stops + 1); deleting stops later leaves gaps on purpose.
pub async fn add_stop_to_trip(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<StopCreate>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let trip = authorize_trip(&client, user.user_id, &path.into_inner()).await?;
    let trip_id = trip.id.ok_or_else(|| ApiError::not_found("Trip"))?;

    let input = input.into_inner();

    let city_id =
        ObjectId::parse_str(&input.city_id).map_err(|_| ApiError::not_found("City"))?;
    let city = find_city(&client, city_id).await?;

    if input.start_date >= input.end_date {
        return Err(ApiError::Validation(
            "End date must be after start date".to_string(),
        ));
    }
    if input.start_date < trip.start_date || input.end_date > trip.end_date {
        return Err(ApiError::Validation(
            "Stop dates must be within trip dates".to_string(),
        ));
    }

    let stops: mongodb::Collection<Stop> = client.database(DB_NAME).collection("Stops");
    let existing = stops.count_documents(doc! { "trip_id": trip_id }).await?;

    let now = Utc::now();
    let mut stop = Stop {
        id: None,
        trip_id,
        city_id,
        order: existing as i32 + 1,
        start_date: input.start_date,
        end_date: input.end_date,
        transport_cost: input.transport_cost,
        notes: input.notes,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let result = stops.insert_one(&stop).await?;
    stop.id = result.inserted_id.as_object_id();

    Ok(HttpResponse::Created().json(StopWithCity { stop, city }))
}

pub async fn get_trip_stops(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let trip = authorize_trip(&client, user.user_id, &path.into_inner()).await?;

    let stops: mongodb::Collection<Stop> = client.database(DB_NAME).collection("Stops");
    let trip_stops = stops
        .find(doc! { "trip_id": trip.id })
        .sort(doc! { "order": 1 })
        .await?
        .try_collect::<Vec<Stop>>()
        .await?;

    let mut out = Vec::with_capacity(trip_stops.len());
    for stop in trip_stops {
        let city = find_city(&client, stop.city_id).await?;
        out.push(StopWithCity { stop, city });
    }

    Ok(HttpResponse::Ok().json(out))
}

pub async fn get_stop(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let (stop, _trip) = authorize_stop(&client, user.user_id, &path.into_inner()).await?;
    let city = find_city(&client, stop.city_id).await?;
    Ok(HttpResponse::Ok().json(StopWithCity { stop, city }))
}

pub async fn update_stop(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<StopUpdate>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let (mut stop, _trip) = authorize_stop(&client, user.user_id, &path.into_inner()).await?;

    let input = input.into_inner();

    let start = input.start_date.unwrap_or(stop.start_date);
    let end = input.end_date.unwrap_or(stop.end_date);
    if start >= end {
        return Err(ApiError::Validation(
            "End date must be after start date".to_string(),
        ));
    }

    stop.start_date = start;
    stop.end_date = end;
    if let Some(notes) = input.notes {
        stop.notes = Some(notes);
    }
    if let Some(order) = input.order {
        stop.order = order;
    }
    stop.updated_at = Some(Utc::now());

    let stops: mongodb::Collection<Stop> = client.database(DB_NAME).collection("Stops");
    stops.replace_one(doc! { "_id": stop.id }, &stop).await?;

    let city = find_city(&client, stop.city_id).await?;
    Ok(HttpResponse::Ok().json(StopWithCity { stop, city }))
}

pub async fn delete_stop(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let (stop, _trip) = authorize_stop(&client, user.user_id, &path.into_inner()).await?;
    let stop_id = stop.id.ok_or_else(|| ApiError::not_found("Stop"))?;

    let db = client.database(DB_NAME);
    db.collection::<mongodb::bson::Document>("StopActivities")
        .delete_many(doc! { "stop_id": stop_id })
        .await?;
    db.collection::<Stop>("Stops")
        .delete_one(doc! { "_id": stop_id })
        .await?;

    // Remaining stops keep their order values; gaps are expected.
    Ok(HttpResponse::NoContent().finish())
}
