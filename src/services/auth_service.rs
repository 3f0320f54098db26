use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr, TransactionTrait};
use uuid::Uuid;

use crate::{
    domain::geo::GeoCoordinate,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionView},
    entity::{
        delivery_boys::ActiveModel as DeliveryActive,
        farmers::ActiveModel as FarmerActive,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::{Role, User},
    response::{ApiResponse, Meta},
    services::profile_service,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;
const DUPLICATE_EMAIL: &str = "This email is already registered. Please login instead.";

/// Creates the account and, in the same transaction, the profile row for its role.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let RegisterRequest {
        email,
        password,
        role,
        full_name,
        phone,
        farmer,
        delivery,
    } = payload;

    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let farmer = match role {
        Role::Farmer => {
            let farmer = farmer
                .filter(|f| !f.business_name.trim().is_empty())
                .ok_or_else(|| AppError::Validation("Farmer signup requires a business_name".into()))?;
            let location = GeoCoordinate::from_parts(farmer.latitude, farmer.longitude)?;
            Some((farmer, location))
        }
        _ => None,
    };

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(state.db())
        .await?;
    if exist.is_some() {
        return Err(AppError::Validation(DUPLICATE_EMAIL.into()));
    }

    let password_hash = hash_password(&password)?;

    let txn = state.db().begin().await?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        full_name: Set(full_name.unwrap_or_default()),
        phone: Set(phone.clone()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| user_insert_error(err.sql_err(), err))?;

    let profile_id = match farmer {
        Some((farmer, location)) => {
            let row = FarmerActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                business_name: Set(farmer.business_name.trim().to_string()),
                description: Set(farmer.description),
                phone: Set(phone),
                address: Set(farmer.address),
                city: Set(farmer.city),
                state: Set(farmer.state),
                latitude: Set(location.map(|l| l.latitude)),
                longitude: Set(location.map(|l| l.longitude)),
                verified: Set(false),
                rating: Set(0.0),
                total_reviews: Set(0),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            Some(row.id)
        }
        None if role == Role::Delivery => {
            let row = DeliveryActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                phone: Set(phone),
                vehicle_type: Set(delivery.and_then(|d| d.vehicle_type)),
                is_available: Set(true),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            Some(row.id)
        }
        None => None,
    };

    txn.commit().await?;

    tracing::info!(user_id = %user.id, role = ?role, "user registered");

    Ok(ApiResponse::success(
        "User created",
        RegisterResponse {
            user: User::from(user),
            role,
            profile_id,
        },
        None,
    ))
}

pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();
    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(state.db())
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let token = issue_token(user.id, &user.email, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    let role = profile_service::resolve_role(state.db(), user.id).await?;

    tracing::info!(user_id = %user.id, role = ?role, "user signed in");

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
            role,
        },
        Some(Meta::empty()),
    ))
}

pub fn current_session(session: &Session) -> ApiResponse<SessionView> {
    ApiResponse::success(
        "Session",
        SessionView {
            user_id: session.user.user_id,
            email: session.user.email.clone(),
            role: session.role(),
            profile_id: session.profile.profile_id(),
        },
        Some(Meta::empty()),
    )
}

/// Tokens are stateless; signing out is recorded and the client drops its token.
pub fn logout_user(session: &Session) -> ApiResponse<serde_json::Value> {
    tracing::info!(user_id = %session.user.user_id, "user signed out");
    ApiResponse::success("Logged out", serde_json::json!({}), Some(Meta::empty()))
}

pub fn issue_token(user_id: Uuid, email: &str, secret: &str, ttl_hours: i64) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// A concurrent signup with the same email passes the lookup and trips the unique index instead.
fn user_insert_error(kind: Option<SqlErr>, err: DbErr) -> AppError {
    match kind {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Validation(DUPLICATE_EMAIL.into()),
        _ => AppError::Store(err),
    }
}
