use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::models::activity::StopActivity;
use crate::models::stop::Stop;
use crate::models::trip::Trip;

/// A fully materialized deep copy of a trip, ready to insert. Ids are assigned
/// here so stops and activity links can reference the new documents before
/// anything is written.
pub struct TripCopy {
    pub trip: Trip,
    pub stops: Vec<Stop>,
    pub stop_activities: Vec<StopActivity>,
}

/// Builds an independent copy of `source` owned by `new_owner`.
///
/// The copy always starts as a private draft: `is_public` is forced off and no
/// share token is carried over, regardless of the source's sharing state.
/// Stop order values, dates, notes, transport costs and activity cost
/// snapshots are preserved as-is.
pub fn build_trip_copy(
    source: &Trip,
    stops: &[(Stop, Vec<StopActivity>)],
    new_owner: ObjectId,
) -> TripCopy {
    let now = Utc::now();
    let new_trip_id = ObjectId::new();

    let trip = Trip {
        id: Some(new_trip_id),
        user_id: new_owner,
        name: format!("Copy of {}", source.name),
        description: source.description.clone(),
        start_date: source.start_date,
        end_date: source.end_date,
        cover_photo: source.cover_photo.clone(),
        is_public: false,
        share_token: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let mut new_stops = Vec::with_capacity(stops.len());
    let mut new_links = Vec::new();

    for (stop, links) in stops {
        let new_stop_id = ObjectId::new();
        new_stops.push(Stop {
            id: Some(new_stop_id),
            trip_id: new_trip_id,
            city_id: stop.city_id,
            order: stop.order,
            start_date: stop.start_date,
            end_date: stop.end_date,
            transport_cost: stop.transport_cost,
            notes: stop.notes.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        });

        for link in links {
            new_links.push(StopActivity {
                id: Some(ObjectId::new()),
                stop_id: new_stop_id,
                activity_id: link.activity_id,
                actual_cost: link.actual_cost,
            });
        }
    }

    TripCopy {
        trip,
        stops: new_stops,
        stop_activities: new_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn source_trip(is_public: bool, share_token: Option<String>) -> Trip {
        Trip {
            id: Some(ObjectId::new()),
            user_id: ObjectId::new(),
            name: "Euro Summer".to_string(),
            description: Some("Two weeks across Europe".to_string()),
            start_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap(),
            cover_photo: Some("https://example.com/photo.jpg".to_string()),
            is_public,
            share_token,
            created_at: None,
            updated_at: None,
        }
    }

    fn source_stop(trip_id: ObjectId, order: i32) -> Stop {
        Stop {
            id: Some(ObjectId::new()),
            trip_id,
            city_id: ObjectId::new(),
            order,
            start_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 6, 0, 0, 0).unwrap(),
            transport_cost: Some(150.0),
            notes: Some("take the night train".to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    fn source_link(stop_id: ObjectId, actual_cost: Option<f64>) -> StopActivity {
        StopActivity {
            id: Some(ObjectId::new()),
            stop_id,
            activity_id: ObjectId::new(),
            actual_cost,
        }
    }

    #[test]
    fn copy_preserves_stop_and_activity_counts() {
        let source = source_trip(true, Some("tok".into()));
        let trip_id = source.id.unwrap();
        let stop_a = source_stop(trip_id, 1);
        let stop_b = source_stop(trip_id, 2);
        let stops = vec![
            (
                stop_a.clone(),
                vec![
                    source_link(stop_a.id.unwrap(), Some(50.0)),
                    source_link(stop_a.id.unwrap(), None),
                ],
            ),
            (stop_b.clone(), vec![source_link(stop_b.id.unwrap(), Some(20.0))]),
        ];

        let copy = build_trip_copy(&source, &stops, ObjectId::new());
        assert_eq!(copy.stops.len(), 2);
        assert_eq!(copy.stop_activities.len(), 3);
    }

    #[test]
    fn copy_references_new_ids_only() {
        let source = source_trip(true, None);
        let trip_id = source.id.unwrap();
        let stop = source_stop(trip_id, 1);
        let stops = vec![(stop.clone(), vec![source_link(stop.id.unwrap(), Some(5.0))])];
        let new_owner = ObjectId::new();

        let copy = build_trip_copy(&source, &stops, new_owner);

        let new_trip_id = copy.trip.id.unwrap();
        assert_ne!(new_trip_id, trip_id);
        assert_eq!(copy.trip.user_id, new_owner);

        for new_stop in &copy.stops {
            assert_eq!(new_stop.trip_id, new_trip_id);
            assert_ne!(new_stop.id, stop.id);
        }
        let new_stop_id = copy.stops[0].id.unwrap();
        for link in &copy.stop_activities {
            assert_eq!(link.stop_id, new_stop_id);
            assert_ne!(link.stop_id, stop.id.unwrap());
        }
    }

    #[test]
    fn copy_is_always_a_private_draft() {
        let source = source_trip(true, Some("shared-token".into()));
        let copy = build_trip_copy(&source, &[], ObjectId::new());
        assert!(!copy.trip.is_public);
        assert!(copy.trip.share_token.is_none());
        assert_eq!(copy.trip.name, "Copy of Euro Summer");
    }

    #[test]
    fn copy_preserves_stop_fields_and_cost_snapshots() {
        let source = source_trip(false, None);
        let trip_id = source.id.unwrap();
        let stop = source_stop(trip_id, 3);
        let stops = vec![(stop.clone(), vec![source_link(stop.id.unwrap(), Some(42.0))])];

        let copy = build_trip_copy(&source, &stops, ObjectId::new());
        let new_stop = &copy.stops[0];
        assert_eq!(new_stop.order, 3);
        assert_eq!(new_stop.city_id, stop.city_id);
        assert_eq!(new_stop.start_date, stop.start_date);
        assert_eq!(new_stop.end_date, stop.end_date);
        assert_eq!(new_stop.transport_cost, Some(150.0));
        assert_eq!(new_stop.notes.as_deref(), Some("take the night train"));
        assert_eq!(copy.stop_activities[0].actual_cost, Some(42.0));
    }
}
