use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::models::city::City;

#[derive(serde::Deserialize)]
pub struct SearchParams {
    search: Option<String>,
    country: Option<String>,
    region: Option<String>,
    min_cost: Option<f64>,
    max_cost: Option<f64>,
    limit: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct PopularParams {
    limit: Option<i64>,
}

fn contains_filter(text: &str) -> Document {
    doc! { "$regex": regex::escape(text), "$options": "i" }
}

/// Search and filter the city catalog. Sorted by popularity unless a filter
/// narrows it down first.
pub async fn search_cities(
    data: web::Data<Arc<Client>>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<City> = client.database(DB_NAME).collection("Cities");

    let mut filter = doc! {};
    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        filter.insert(
            "$or",
            vec![
                doc! { "name": contains_filter(search) },
                doc! { "country": contains_filter(search) },
            ],
        );
    }
    if let Some(country) = params.country.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("country", contains_filter(country));
    }
    if let Some(region) = params.region.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("region", contains_filter(region));
    }

    let mut cost = doc! {};
    if let Some(min_cost) = params.min_cost {
        cost.insert("$gte", min_cost);
    }
    if let Some(max_cost) = params.max_cost {
        cost.insert("$lte", max_cost);
    }
    if !cost.is_empty() {
        filter.insert("avg_cost_per_day", cost);
    }

    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let cities = collection
        .find(filter)
        .sort(doc! { "popularity_score": -1 })
        .limit(limit)
        .await?
        .try_collect::<Vec<City>>()
        .await?;

    Ok(HttpResponse::Ok().json(cities))
}

pub async fn get_popular_cities(
    data: web::Data<Arc<Client>>,
    params: web::Query<PopularParams>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<City> = client.database(DB_NAME).collection("Cities");

    let limit = params.limit.unwrap_or(10).clamp(1, 50);

    let cities = collection
        .find(doc! {})
        .sort(doc! { "popularity_score": -1 })
        .limit(limit)
        .await?
        .try_collect::<Vec<City>>()
        .await?;

    Ok(HttpResponse::Ok().json(cities))
}

pub async fn get_city(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<City> = client.database(DB_NAME).collection("Cities");

    let id = ObjectId::parse_str(&path.into_inner()).map_err(|_| ApiError::not_found("City"))?;

    let city = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::not_found("City"))?;

    Ok(HttpResponse::Ok().json(city))
}
