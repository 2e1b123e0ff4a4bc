use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo::User,
        services::{hash_password, is_valid_email, verify_password, AuthUser, JwtKeys},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn token_pair(keys: &JwtKeys, user_id: uuid::Uuid) -> anyhow::Result<(String, String)> {
    Ok((keys.sign_access(user_id)?, keys.sign_refresh(user_id)?))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal(e));
        }
    }

    let hash = hash_password(&payload.password).map_err(internal)?;
    let user = User::create(&state.db, &payload.email, &hash)
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            internal(e)
        })?;

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = token_pair(&keys, user.id).map_err(internal)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(internal(e));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(internal)?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = token_pair(&keys, user.id).map_err(internal)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let (access_token, refresh_token) = token_pair(&keys, claims.sub).map_err(internal)?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            error!(user_id = %user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}

#[cfg(test)]
mod register_db_tests {
    use super::*;
    use axum::extract::State;

    async fn test_state() -> Option<AppState> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .ok()?;
        sqlx::migrate!("./migrations").run(&db).await.ok()?;
        let mut state = AppState::fake();
        state.db = db;
        Some(state)
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a migratable Postgres"]
    async fn duplicate_email_is_a_conflict() {
        let Some(state) = test_state().await else {
            return;
        };
        let email = format!("dup-{}@example.com", uuid::Uuid::new_v4().simple());

        register(
            State(state.clone()),
            Json(RegisterRequest {
                email: email.clone(),
                password: "longenough1".into(),
            }),
        )
        .await
        .expect("first registration succeeds");

        let (status, _) = register(
            State(state),
            Json(RegisterRequest {
                email,
                password: "longenough1".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
