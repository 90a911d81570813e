use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Read-only catalog entry, always tied to a city.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Activity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub city_id: ObjectId,
    pub name: String,
    pub category: Option<String>, // e.g. "Sightseeing", "Food", "Adventure"
    pub description: Option<String>,
    pub estimated_cost: Option<f64>,
    pub duration_hours: Option<f64>,
    pub image_url: Option<String>,
}

/// Link document connecting a stop of a trip to a catalog activity.
///
/// `actual_cost` is a snapshot taken when the activity is attached; editing the
/// catalog entry afterwards does not change it.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StopActivity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub stop_id: ObjectId,
    pub activity_id: ObjectId,
    pub actual_cost: Option<f64>,
}
