use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aula_db::Database;
use aula_engine::clock::Clock;
use aula_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub clock: Arc<dyn Clock>,
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.fullname.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Missing fields"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let user_id = Uuid::new_v4();

    // Argon2 hashing is CPU-bound; run it with the insert off the async runtime
    let db = state.db.clone();
    let fullname = req.fullname.clone();
    let email = req.email.clone();
    let created = tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(ApiError::internal)?
            .to_string();

        db.create_user(&user_id.to_string(), &fullname, &email, &password_hash)
            .map_err(ApiError::internal)
    })
    .await
    .map_err(ApiError::internal)??;

    if !created {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let token = create_token(&state.jwt_secret, user_id, &req.email).map_err(ApiError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            user_id,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Missing email or password"));
    }

    let db = state.db.clone();
    let email = req.email.clone();
    let user = tokio::task::spawn_blocking(move || {
        let user = db
            .get_user_by_email(&email)
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        // Verify password
        let parsed_hash = PasswordHash::new(&user.password).map_err(ApiError::internal)?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

        Ok::<_, ApiError>(user)
    })
    .await
    .map_err(ApiError::internal)??;

    let user_id: Uuid = user.id.parse().map_err(ApiError::internal)?;

    let token = create_token(&state.jwt_secret, user_id, &user.email).map_err(ApiError::internal)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user_id,
        fullname: user.fullname,
        email: user.email,
        token,
    }))
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{DecodingKey, Validation, decode};

    use super::*;

    #[test]
    fn tokens_round_trip_with_the_signing_secret() {
        let user_id = Uuid::new_v4();
        let token = create_token("test-secret", user_id, "ana@example.com").unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user_id);
        assert_eq!(decoded.claims.email, "ana@example.com");
    }

    #[test]
    fn tokens_reject_the_wrong_secret() {
        let token = create_token("test-secret", Uuid::new_v4(), "ana@example.com").unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
