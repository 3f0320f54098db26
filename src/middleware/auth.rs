use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    entity::{delivery_boys, farmers},
    error::AppError,
    models::Role,
    services::profile_service::{self, Profile},
    state::AppState,
};

/// Identity proven by a bearer token, before any role lookup.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Per-request session context: the authenticated user plus the role resolved for them
/// on this request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub profile: Profile,
}

impl Session {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn farmer(&self) -> Result<&farmers::Model, AppError> {
        match &self.profile {
            Profile::Farmer(farmer) => Ok(farmer),
            _ => Err(AppError::Forbidden),
        }
    }

    pub fn rider(&self) -> Result<&delivery_boys::Model, AppError> {
        match &self.profile {
            Profile::Delivery(rider) => Ok(rider),
            _ => Err(AppError::Forbidden),
        }
    }

    pub fn ensure_consumer(&self) -> Result<(), AppError> {
        ensure_role(self, Role::Consumer)
    }
}

pub fn ensure_role(session: &Session, role: Role) -> Result<(), AppError> {
    if session.role() != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        email: decoded.claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        decode_token(token, &state.config.jwt_secret)
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let profile = profile_service::resolve_profile(state.db(), user.user_id).await?;
        Ok(Session { user, profile })
    }
}
