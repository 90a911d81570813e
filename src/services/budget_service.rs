use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::activity::StopActivity;
use crate::models::city::City;
use crate::models::stop::Stop;

/// One stop together with everything its budget lines are derived from.
pub struct StopBudget {
    pub stop: Stop,
    pub city: City,
    pub activities: Vec<StopActivity>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategories {
    pub accommodation: f64,
    pub activities: f64,
    pub transport: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StopBreakdown {
    pub city: String,
    pub days: i64,
    pub accommodation: f64,
    pub activities: f64,
    pub subtotal: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BudgetReport {
    pub total_budget: f64,
    pub categories: BudgetCategories,
    pub breakdown: Vec<StopBreakdown>,
}

/// Nights charged for a stay. Same-day or inverted ranges clamp to one day;
/// such ranges are rejected at write time, but the floor keeps an equal-day
/// edge case from zeroing out accommodation if one ever reaches us.
pub fn duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days().max(1)
}

/// Recomputes the whole budget from current persisted state. No caching: the
/// per-trip cardinality is tens of stops at most, and recomputing guarantees
/// the figure always matches the latest edits.
pub fn compute_budget(stops: &[StopBudget]) -> BudgetReport {
    let mut total_accommodation = 0.0;
    let mut total_activities = 0.0;
    let mut total_transport = 0.0;
    let mut breakdown = Vec::with_capacity(stops.len());

    for entry in stops {
        let days = duration_days(entry.stop.start_date, entry.stop.end_date);

        let accommodation = entry.city.avg_cost_per_day.unwrap_or(0.0) * days as f64;
        let activities: f64 = entry
            .activities
            .iter()
            .map(|link| link.actual_cost.unwrap_or(0.0))
            .sum();
        let transport = entry.stop.transport_cost.unwrap_or(0.0);

        total_accommodation += accommodation;
        total_activities += activities;
        total_transport += transport;

        breakdown.push(StopBreakdown {
            city: entry.city.name.clone(),
            days,
            accommodation,
            activities,
            subtotal: accommodation + activities + transport,
        });
    }

    BudgetReport {
        total_budget: total_accommodation + total_activities + total_transport,
        categories: BudgetCategories {
            accommodation: total_accommodation,
            activities: total_activities,
            transport: total_transport,
        },
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson::oid::ObjectId;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
    }

    fn city(name: &str, avg_cost_per_day: Option<f64>) -> City {
        City {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            country: "Testland".to_string(),
            region: None,
            description: None,
            image_url: None,
            avg_cost_per_day,
            popularity_score: Some(50),
            latitude: None,
            longitude: None,
        }
    }

    fn stop(start_day: u32, end_day: u32, transport_cost: Option<f64>) -> Stop {
        Stop {
            id: Some(ObjectId::new()),
            trip_id: ObjectId::new(),
            city_id: ObjectId::new(),
            order: 1,
            start_date: date(start_day),
            end_date: date(end_day),
            transport_cost,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn link(actual_cost: Option<f64>) -> StopActivity {
        StopActivity {
            id: Some(ObjectId::new()),
            stop_id: ObjectId::new(),
            activity_id: ObjectId::new(),
            actual_cost,
        }
    }

    #[test]
    fn worked_example_two_stops() {
        // Stop A: 100/day for 5 days plus one 50 activity. Stop B: 80/day for 3 days.
        let stops = vec![
            StopBudget {
                stop: stop(1, 6, None),
                city: city("Paris", Some(100.0)),
                activities: vec![link(Some(50.0))],
            },
            StopBudget {
                stop: stop(6, 9, None),
                city: city("London", Some(80.0)),
                activities: vec![],
            },
        ];

        let report = compute_budget(&stops);
        assert_eq!(report.categories.accommodation, 740.0);
        assert_eq!(report.categories.activities, 50.0);
        assert_eq!(report.categories.transport, 0.0);
        assert_eq!(report.total_budget, 790.0);

        assert_eq!(report.breakdown.len(), 2);
        assert_eq!(report.breakdown[0].city, "Paris");
        assert_eq!(report.breakdown[0].days, 5);
        assert_eq!(report.breakdown[0].subtotal, 550.0);
        assert_eq!(report.breakdown[1].days, 3);
        assert_eq!(report.breakdown[1].subtotal, 240.0);
    }

    #[test]
    fn transport_costs_are_included_in_totals() {
        let stops = vec![
            StopBudget {
                stop: stop(1, 6, Some(0.0)),
                city: city("Paris", Some(100.0)),
                activities: vec![link(Some(50.0))],
            },
            StopBudget {
                stop: stop(6, 10, Some(150.0)),
                city: city("London", Some(80.0)),
                activities: vec![],
            },
        ];

        let report = compute_budget(&stops);
        assert_eq!(report.categories.transport, 150.0);
        assert_eq!(report.categories.activities, 50.0);
        assert_eq!(
            report.total_budget,
            report.categories.accommodation
                + report.categories.activities
                + report.categories.transport
        );
        // Transport counts toward the stop it leads into.
        assert_eq!(report.breakdown[1].subtotal, 320.0 + 150.0);
    }

    #[test]
    fn same_day_stay_is_charged_one_day() {
        assert_eq!(duration_days(date(3), date(3)), 1);
        assert_eq!(duration_days(date(5), date(3)), 1);

        let stops = vec![StopBudget {
            stop: stop(3, 3, None),
            city: city("Rome", Some(100.0)),
            activities: vec![],
        }];
        assert_eq!(compute_budget(&stops).categories.accommodation, 100.0);
    }

    #[test]
    fn missing_rates_and_costs_count_as_zero() {
        let stops = vec![StopBudget {
            stop: stop(1, 4, None),
            city: city("Nowhere", None),
            activities: vec![link(None), link(Some(25.0))],
        }];

        let report = compute_budget(&stops);
        assert_eq!(report.categories.accommodation, 0.0);
        assert_eq!(report.categories.activities, 25.0);
        assert_eq!(report.total_budget, 25.0);
    }

    #[test]
    fn empty_trip_has_zero_budget() {
        let report = compute_budget(&[]);
        assert_eq!(report.total_budget, 0.0);
        assert!(report.breakdown.is_empty());
    }

    #[test]
    fn recomputation_is_idempotent() {
        let stops = vec![StopBudget {
            stop: stop(1, 6, Some(75.0)),
            city: city("Paris", Some(120.0)),
            activities: vec![link(Some(30.0)), link(Some(45.5))],
        }];

        assert_eq!(compute_budget(&stops), compute_budget(&stops));
    }
}
