use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Immutable reference data for stops and activities.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct City {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    // Cost and popularity metrics
    pub avg_cost_per_day: Option<f64>, // USD
    pub popularity_score: Option<i32>, // 0-100
    // Coordinates (optional for maps)
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
