use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::activity::{Activity, StopActivity};
use crate::services::ownership_service::authorize_stop;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    city_id: Option<String>,
    category: Option<String>,
}

/// Trimmed catalog view for search results.
#[derive(Debug, Serialize)]
pub struct ActivitySummary {
    pub id: ObjectId,
    pub name: String,
    pub category: Option<String>,
    pub estimated_cost: Option<f64>,
    pub city_id: ObjectId,
}

#[derive(Debug, Deserialize)]
pub struct ActivityAttach {
    pub activity_id: String,
    // Overrides the catalog's estimated cost for this trip's budget.
    pub actual_cost: Option<f64>,
}

/// Link plus its resolved catalog entry, for itinerary views.
#[derive(Debug, Serialize)]
pub struct StopActivityView {
    #[serde(flatten)]
    pub link: StopActivity,
    pub activity: Activity,
}

pub async fn search_activities(
    data: web::Data<Arc<Client>>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<Activity> =
        client.database(DB_NAME).collection("Activities");

    let mut filter = doc! {};
    if let Some(city_id) = params.city_id.as_deref().filter(|s| !s.is_empty()) {
        let id = ObjectId::parse_str(city_id).map_err(|_| ApiError::not_found("City"))?;
        filter.insert("city_id", id);
    }
    if let Some(category) = params.category.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("category", category);
    }

    let activities = collection
        .find(filter)
        .limit(50)
        .await?
        .try_collect::<Vec<Activity>>()
        .await?;

    let summaries: Vec<ActivitySummary> = activities
        .into_iter()
        .map(|a| ActivitySummary {
            id: a.id.unwrap_or_default(),
            name: a.name,
            category: a.category,
            estimated_cost: a.estimated_cost,
            city_id: a.city_id,
        })
        .collect();

    Ok(HttpResponse::Ok().json(summaries))
}

/// Attaches a catalog activity to a stop. The cost recorded on the link is a
/// snapshot: the caller's override if given, the catalog estimate otherwise.
pub async fn add_activity_to_stop(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<ActivityAttach>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let (stop, _trip) = authorize_stop(&client, user.user_id, &path.into_inner()).await?;
    let stop_id = stop.id.ok_or_else(|| ApiError::not_found("Stop"))?;

    let input = input.into_inner();
    let activity_id =
        ObjectId::parse_str(&input.activity_id).map_err(|_| ApiError::not_found("Activity"))?;

    let activities: mongodb::Collection<Activity> =
        client.database(DB_NAME).collection("Activities");
    let activity = activities
        .find_one(doc! { "_id": activity_id })
        .await?
        .ok_or_else(|| ApiError::not_found("Activity"))?;

    let link = StopActivity {
        id: None,
        stop_id,
        activity_id,
        actual_cost: input.actual_cost.or(activity.estimated_cost),
    };

    let links: mongodb::Collection<StopActivity> =
        client.database(DB_NAME).collection("StopActivities");
    links.insert_one(&link).await?;

    Ok(HttpResponse::Created().json(json!({ "message": "Activity added" })))
}

pub async fn get_stop_activities(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let (stop, _trip) = authorize_stop(&client, user.user_id, &path.into_inner()).await?;

    let links: mongodb::Collection<StopActivity> =
        client.database(DB_NAME).collection("StopActivities");
    let activities: mongodb::Collection<Activity> =
        client.database(DB_NAME).collection("Activities");

    let stop_links = links
        .find(doc! { "stop_id": stop.id })
        .await?
        .try_collect::<Vec<StopActivity>>()
        .await?;

    let mut out = Vec::with_capacity(stop_links.len());
    for link in stop_links {
        let activity = activities
            .find_one(doc! { "_id": link.activity_id })
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!("activity {} missing from catalog", link.activity_id))
            })?;
        out.push(StopActivityView { link, activity });
    }

    Ok(HttpResponse::Ok().json(out))
}

pub async fn remove_activity_from_stop(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let (stop_id, activity_id) = path.into_inner();

    let (stop, _trip) = authorize_stop(&client, user.user_id, &stop_id).await?;
    let activity_id =
        ObjectId::parse_str(&activity_id).map_err(|_| ApiError::not_found("Activity"))?;

    let links: mongodb::Collection<StopActivity> =
        client.database(DB_NAME).collection("StopActivities");
    let result = links
        .delete_many(doc! { "stop_id": stop.id, "activity_id": activity_id })
        .await?;

    if result.deleted_count == 0 {
        return Err(ApiError::NotFound(
            "Activity not linked to this stop".to_string(),
        ));
    }

    Ok(HttpResponse::NoContent().finish())
}
