use chrono::{TimeZone, Utc};
use mongodb::bson::oid::ObjectId;

use globetrotter_api::models::activity::StopActivity;
use globetrotter_api::models::city::City;
use globetrotter_api::models::stop::Stop;
use globetrotter_api::services::budget_service::{compute_budget, StopBudget};

fn sample_input() -> Vec<StopBudget> {
    let trip_id = ObjectId::new();
    let paris = City {
        id: Some(ObjectId::new()),
        name: "Paris".to_string(),
        country: "France".to_string(),
        region: Some("Europe".to_string()),
        description: None,
        image_url: None,
        avg_cost_per_day: Some(100.0),
        popularity_score: Some(95),
        latitude: None,
        longitude: None,
    };
    let stop = Stop {
        id: Some(ObjectId::new()),
        trip_id,
        city_id: paris.id.unwrap(),
        order: 1,
        start_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 6, 6, 0, 0, 0).unwrap(),
        transport_cost: Some(150.0),
        notes: None,
        created_at: None,
        updated_at: None,
    };
    let link = StopActivity {
        id: Some(ObjectId::new()),
        stop_id: stop.id.unwrap(),
        activity_id: ObjectId::new(),
        actual_cost: Some(50.0),
    };
    vec![StopBudget {
        stop,
        city: paris,
        activities: vec![link],
    }]
}

/// The budget endpoint's wire format is consumed by the frontend pie/bar
/// charts; field names are part of the contract.
#[test]
fn budget_report_serializes_to_the_documented_shape() {
    let report = compute_budget(&sample_input());
    let value = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(value["total_budget"], 700.0);
    assert_eq!(value["categories"]["accommodation"], 500.0);
    assert_eq!(value["categories"]["activities"], 50.0);
    assert_eq!(value["categories"]["transport"], 150.0);

    let breakdown = value["breakdown"].as_array().expect("breakdown array");
    assert_eq!(breakdown.len(), 1);
    let row = &breakdown[0];
    assert_eq!(row["city"], "Paris");
    assert_eq!(row["days"], 5);
    assert_eq!(row["accommodation"], 500.0);
    assert_eq!(row["activities"], 50.0);
    assert_eq!(row["subtotal"], 700.0);
}

#[test]
fn category_totals_always_sum_to_the_total() {
    let report = compute_budget(&sample_input());
    assert_eq!(
        report.total_budget,
        report.categories.accommodation + report.categories.activities + report.categories.transport
    );
}
