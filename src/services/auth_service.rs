use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, SqlErr,
    ActiveValue::{Set, Unchanged},
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    config::AppConfig,
    dto::auth::{
        AuthResponse, Claims, DirectResetRequest, ForgotPasswordRequest, ForgotPasswordResponse,
        LoginRequest, ProfileResponse, RegisterRequest, ResetPasswordRequest,
    },
    entity::{
        json::{IdList, SavedAddresses},
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::{auth::AuthUser, origin::RequestOrigin},
    response::{ApiResponse, Meta},
    state::AppState,
};

const RESET_TOKEN_TTL_MINUTES: i64 = 30;
const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user: &users::Model) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        is_admin: user.is_admin,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Hex SHA-256 of a raw reset token; only the digest is persisted.
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Fresh reset token as `(raw, digest)`.
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);
    let digest = hash_reset_token(&raw);
    (raw, digest)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_new_password(password: Option<&str>) -> AppResult<&str> {
    match password {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LEN => Ok(p),
        _ => Err(AppError::bad_request(
            "Password must be at least 6 characters",
        )),
    }
}

fn auth_response(config: &AppConfig, user: &users::Model) -> AppResult<AuthResponse> {
    Ok(AuthResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        token: issue_token(config, user)?,
    })
}

async fn set_password(state: &AppState, user: users::Model, password: &str) -> AppResult<()> {
    UserActive {
        id: Unchanged(user.id),
        password_hash: Set(hash_password(password)?),
        reset_password_token: Set(None),
        reset_password_expires: Set(None),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .update(&state.orm)
    .await?;
    Ok(())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    let email = normalize_email(&email);
    if name.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::bad_request("Invalid user data"));
    }

    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::bad_request("User already exists"));
    }

    let now = Utc::now();
    let inserted = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        is_admin: Set(false),
        addresses: Set(SavedAddresses::default()),
        wishlist: Set(IdList::default()),
        reset_password_token: Set(None),
        reset_password_expires: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::bad_request("User already exists"));
        }
        Err(err) => return Err(err.into()),
    };

    log_audit(
        &state.orm,
        Some(user.id),
        "user_register",
        Some("users".into()),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await;

    let resp = auth_response(&state.config, &user)?;
    Ok(ApiResponse::success("User created", resp, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(normalize_email(&email)))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) if verify_password(&password, &u.password_hash)? => u,
        _ => return Err(AppError::unauthorized("Invalid email or password")),
    };

    let resp = auth_response(&state.config, &user)?;
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn get_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let found = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success("Profile", found.into(), None))
}

pub async fn forgot_password(
    state: &AppState,
    origin: &RequestOrigin,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<ForgotPasswordResponse>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(normalize_email(&payload.email)))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let (raw, digest) = generate_reset_token();
    let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

    UserActive {
        id: Unchanged(user.id),
        reset_password_token: Set(Some(digest)),
        reset_password_expires: Set(Some(expires.into())),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .update(&state.orm)
    .await?;

    tracing::debug!(user_id = %user.id, "password reset token issued");

    let reset_url = format!("{}/reset-password/{raw}", origin.as_str());
    Ok(ApiResponse::success(
        "Reset link generated",
        ForgotPasswordResponse { reset_url },
        None,
    ))
}

pub async fn reset_password(
    state: &AppState,
    token: &str,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let user = Users::find()
        .filter(UserCol::ResetPasswordToken.eq(hash_reset_token(token)))
        .filter(UserCol::ResetPasswordExpires.gt(Utc::now()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid or expired reset token"))?;

    let password = validate_new_password(payload.password.as_deref())?;
    set_password(state, user, password).await?;
    Ok(ApiResponse::success("Password reset successful", (), None))
}

pub async fn direct_reset_password(
    state: &AppState,
    payload: DirectResetRequest,
) -> AppResult<ApiResponse<()>> {
    let (Some(email), Some(password)) = (payload.email.as_deref(), payload.password.as_deref())
    else {
        return Err(AppError::bad_request("Email and password are required"));
    };
    let password = validate_new_password(Some(password))?;

    let user = Users::find()
        .filter(UserCol::Email.eq(normalize_email(email)))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found with this email".into()))?;

    set_password(state, user, password).await?;
    Ok(ApiResponse::success("Password updated successfully", (), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 5000,
            jwt_secret: "test-secret".into(),
            jwt_ttl_hours: 1,
            frontend_url: "http://localhost:3000".into(),
            uploads_dir: "uploads".into(),
        }
    }

    fn user(is_admin: bool) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password_hash: String::new(),
            is_admin,
            addresses: SavedAddresses::default(),
            wishlist: IdList::default(),
            reset_password_token: None,
            reset_password_expires: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn tokens_carry_id_and_admin_flag() {
        let config = config();
        let admin = user(true);
        let token = issue_token(&config, &admin).unwrap();

        let claims = decode_token(&config.jwt_secret, &token).unwrap();
        assert_eq!(claims.sub, admin.id.to_string());
        assert!(claims.is_admin);

        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn reset_tokens_store_only_the_digest() {
        let (raw, digest) = generate_reset_token();
        assert_eq!(raw.len(), 40);
        assert_eq!(digest.len(), 64);
        assert_ne!(raw, digest);
        assert_eq!(hash_reset_token(&raw), digest);

        let (other, _) = generate_reset_token();
        assert_ne!(raw, other);
    }

    #[test]
    fn passwords_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_new_password(Some("12345")).is_err());
        assert!(validate_new_password(None).is_err());
        assert_eq!(validate_new_password(Some("123456")).unwrap(), "123456");
    }
}
