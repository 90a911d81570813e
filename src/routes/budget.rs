use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::activity::StopActivity;
use crate::models::city::City;
use crate::models::stop::Stop;
use crate::services::budget_service::{compute_budget, StopBudget};
use crate::services::ownership_service::authorize_trip;

/// Budget aggregate for a trip, recomputed from persisted state on every call.
pub async fn get_trip_budget(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let trip = authorize_trip(&client, user.user_id, &path.into_inner()).await?;

    let db = client.database(DB_NAME);
    let stops: mongodb::Collection<Stop> = db.collection("Stops");
    let cities: mongodb::Collection<City> = db.collection("Cities");
    let links: mongodb::Collection<StopActivity> = db.collection("StopActivities");

    let trip_stops = stops
        .find(doc! { "trip_id": trip.id })
        .sort(doc! { "order": 1 })
        .await?
        .try_collect::<Vec<Stop>>()
        .await?;

    let mut inputs = Vec::with_capacity(trip_stops.len());
    for stop in trip_stops {
        let city = cities
            .find_one(doc! { "_id": stop.city_id })
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!("city {} missing for stop", stop.city_id))
            })?;

        let activities = match stop.id {
            Some(stop_id) => {
                links
                    .find(doc! { "stop_id": stop_id })
                    .await?
                    .try_collect::<Vec<StopActivity>>()
                    .await?
            }
            None => Vec::new(),
        };

        inputs.push(StopBudget {
            stop,
            city,
            activities,
        });
    }

    Ok(HttpResponse::Ok().json(compute_budget(&inputs)))
}
