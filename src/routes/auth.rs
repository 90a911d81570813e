use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::error::WriteError;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::mongo::DB_NAME;
use crate::errors::ApiError;
use crate::middleware::auth::{jwt_secret, Claims};
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::{User, UserProfile, UserRole};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

pub async fn register(
    data: web::Data<Arc<Client>>,
    input: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DB_NAME).collection("Users");

    let input = input.into_inner();

    if !is_valid_email(&input.email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }

    // The unique indexes are the real guarantee; these checks exist to give
    // callers a specific message instead of a generic duplicate-key error.
    if collection
        .find_one(doc! { "email": &input.email })
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }
    if collection
        .find_one(doc! { "username": &input.username })
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("Username already taken".to_string()));
    }

    let hashed = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;

    let now = Utc::now();
    let mut user = User {
        id: None,
        email: input.email,
        username: input.username,
        password: hashed,
        full_name: input.full_name,
        profile_picture: None,
        role: UserRole::User,
        is_verified: false,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match collection.insert_one(&user).await {
        Ok(result) => {
            user.id = result.inserted_id.as_object_id();
            Ok(HttpResponse::Created().json(UserProfile::from(user)))
        }
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                WriteError { code: 11000, .. },
            )) => Err(ApiError::Conflict("User already exists".to_string())),
            _ => Err(ApiError::Database(err)),
        },
    }
}

pub async fn login(
    data: web::Data<Arc<Client>>,
    input: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DB_NAME).collection("Users");

    let input = input.into_inner();

    let user = collection
        .find_one(doc! { "email": &input.email })
        .await?
        // Same answer for unknown email and wrong password.
        .ok_or_else(|| ApiError::Unauthorized("Incorrect email or password".to_string()))?;

    if !bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
        return Err(ApiError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    }

    let token = create_token(&user)
        .map_err(|e| ApiError::Internal(format!("token generation failed: {}", e)))?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

pub async fn me(
    user: AuthenticatedUser,
    data: web::Data<Arc<Client>>,
) -> Result<HttpResponse, ApiError> {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database(DB_NAME).collection("Users");

    let record = collection
        .find_one(doc! { "_id": user.user_id })
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(record)))
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    re.unwrap().is_match(email)
}

pub fn create_token(user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();

    let claims = Claims {
        sub: user.email.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user.id.unwrap_or_default().to_hex(),
        role: Some(user.role.as_str().to_string()),
    };

    let header = Header::new(Algorithm::HS256);
    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_ref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_email_addresses() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.co"));
    }

    #[test]
    fn rejects_malformed_email_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld@twice.com"));
        assert!(!is_valid_email(""));
    }
}
