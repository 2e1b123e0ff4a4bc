use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::{repo::User, services::AuthUser};
use crate::state::AppState;

/// Authenticated user with the staff flag set; gates the admin surface.
pub struct AdminUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;

        let user = User::find_by_id(&state.db, user_id)
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
            .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

        if !user.is_staff {
            warn!(%user_id, "non-staff user denied admin access");
            return Err((StatusCode::FORBIDDEN, "Staff access required".to_string()));
        }

        Ok(AdminUser(user_id))
    }
}
