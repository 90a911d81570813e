use bson::{doc, oid::ObjectId};
use mongodb::Client;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::models::stop::Stop;
use crate::models::trip::Trip;

/// Ownership guard. Every mutation or detail read of a trip or stop goes
/// through here first.
///
/// Absent entities and entities owned by someone else are indistinguishable to
/// the caller: both come back as `NotFound`, so probing ids reveals nothing.

pub async fn authorize_trip(
    client: &Client,
    user_id: ObjectId,
    trip_id: &str,
) -> Result<Trip, ApiError> {
    let id = ObjectId::parse_str(trip_id).map_err(|_| ApiError::not_found("Trip"))?;

    let trips: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");
    trips
        .find_one(doc! { "_id": id, "user_id": user_id })
        .await?
        .ok_or_else(|| ApiError::not_found("Trip"))
}

/// Resolves a stop and the owning trip in one go. The trip lookup carries the
/// owner filter, so a stop inside a foreign trip reads as missing.
pub async fn authorize_stop(
    client: &Client,
    user_id: ObjectId,
    stop_id: &str,
) -> Result<(Stop, Trip), ApiError> {
    let id = ObjectId::parse_str(stop_id).map_err(|_| ApiError::not_found("Stop"))?;

    let stops: mongodb::Collection<Stop> = client.database(DB_NAME).collection("Stops");
    let stop = stops
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::not_found("Stop"))?;

    let trips: mongodb::Collection<Trip> = client.database(DB_NAME).collection("Trips");
    let trip = trips
        .find_one(doc! { "_id": stop.trip_id, "user_id": user_id })
        .await?
        .ok_or_else(|| ApiError::not_found("Stop"))?;

    Ok((stop, trip))
}
