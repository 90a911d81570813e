use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::city::City;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Stop {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: ObjectId,
    pub city_id: ObjectId,
    // 1-based position in the trip. Assigned as count+1 at creation and never
    // renumbered on delete, so gaps are possible.
    pub order: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub transport_cost: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Stop representation with its city embedded, as returned by the stop routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct StopWithCity {
    #[serde(flatten)]
    pub stop: Stop,
    pub city: City,
}
