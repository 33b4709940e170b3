//! Auth API Endpoints
//!
//! - POST /signup - Create a password account
//! - POST /login - Password-based login
//! - POST /federated-signin - Sign in with an identity-provider token
//!
//! Request DTOs use optional fields and the handlers validate presence
//! themselves, so an absent field, an empty field and an absent body all
//! produce the same 400 with a stable message instead of a framework
//! rejection. No session or token is issued by any of these endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::account::{Account, AccountReconciler, AccountStore};
use crate::auth::password_service::PasswordService;
use crate::auth::token_verifier::IdTokenVerifier;
use crate::shared::api_common::{non_empty, MessageResponse};
use crate::shared::error::{AuthError, ErrorResponse, Result};

/// Signup request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name
    pub full_name: Option<String>,
    /// Email address (unique)
    pub email: Option<String>,
    /// Plain password; only its Argon2 hash is stored
    pub password: Option<String>,
}

impl SignupRequest {
    fn validated(&self) -> Result<(&str, &str, &str)> {
        match (
            non_empty(&self.full_name),
            non_empty(&self.email),
            non_empty(&self.password),
        ) {
            (Some(full_name), Some(email), Some(password)) => Ok((full_name, email, password)),
            _ => Err(AuthError::validation(
                "Fullname, email, and password are required.",
            )),
        }
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,
    /// Password
    pub password: Option<String>,
}

impl LoginRequest {
    fn validated(&self) -> Result<(&str, &str)> {
        match (non_empty(&self.email), non_empty(&self.password)) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AuthError::validation("Email and password are required.")),
        }
    }
}

/// Federated sign-in request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FederatedSignInRequest {
    /// ID token issued by the identity provider
    pub token: Option<String>,
}

impl FederatedSignInRequest {
    fn validated(&self) -> Result<&str> {
        non_empty(&self.token).ok_or_else(|| AuthError::validation("ID token is required."))
    }
}

/// Account as returned to clients; never carries the password hash
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account ID (hex)
    pub id: String,
    /// Display name
    pub full_name: String,
    /// Email address
    pub email: String,
    /// Sign-in provider: "local" or "federated"
    pub provider: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_hex(),
            full_name: account.full_name,
            email: account.email,
            provider: account.provider.to_string(),
        }
    }
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    /// Email address
    pub email: String,
    /// Account ID (hex)
    pub id: String,
}

/// Federated sign-in response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FederatedSignInResponse {
    pub message: String,
    pub account: AccountResponse,
}

/// Auth API state
#[derive(Clone)]
pub struct AuthApiState {
    pub accounts: Arc<dyn AccountStore>,
    pub reconciler: Arc<AccountReconciler>,
    pub password_service: Arc<PasswordService>,
    pub token_verifier: Arc<IdTokenVerifier>,
}

#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    operation_id = "postSignup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Missing fields or email already taken", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AuthApiState>,
    payload: Option<Json<SignupRequest>>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload.ok_or_else(|| {
        AuthError::validation("Fullname, email, and password are required.")
    })?;
    let (full_name, email, password) = req.validated()?;

    let password_hash = state.password_service.hash_password(password)?;
    state
        .reconciler
        .signup_local(full_name, email, password_hash)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created")),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    operation_id = "postLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields or non-password account", body = ErrorResponse),
        (status = 401, description = "Unknown email or wrong password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>> {
    let Json(req) =
        payload.ok_or_else(|| AuthError::validation("Email and password are required."))?;
    let (email, password) = req.validated()?;

    let account = state
        .accounts
        .find_by_email(email)
        .await?
        .ok_or_else(|| AuthError::unauthorized("User not found."))?;

    if !account.is_local() {
        return Err(AuthError::WrongProvider {
            provider: account.provider,
        });
    }

    let hash = account
        .password_hash
        .as_deref()
        .ok_or_else(|| AuthError::internal("local account has no password hash"))?;

    if !state.password_service.verify_password(password, hash)? {
        return Err(AuthError::unauthorized("Invalid password."));
    }

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        email: account.email,
        id: account.id.to_hex(),
    }))
}

#[utoipa::path(
    post,
    path = "/federated-signin",
    tag = "auth",
    operation_id = "postFederatedSignin",
    request_body = FederatedSignInRequest,
    responses(
        (status = 200, description = "Signed in; account created or reconciled", body = FederatedSignInResponse),
        (status = 400, description = "Missing token", body = ErrorResponse),
        (status = 500, description = "Token verification or store failure", body = ErrorResponse)
    )
)]
pub async fn federated_signin(
    State(state): State<AuthApiState>,
    payload: Option<Json<FederatedSignInRequest>>,
) -> Result<Json<FederatedSignInResponse>> {
    let Json(req) = payload.ok_or_else(|| AuthError::validation("ID token is required."))?;
    let token = req.validated()?;

    let identity = state.token_verifier.verify(token).await?;
    let account = state.reconciler.reconcile_federated(&identity).await?;

    Ok(Json(FederatedSignInResponse {
        message: "Federated sign-in successful".to_string(),
        account: AccountResponse::from(account),
    }))
}

pub fn auth_router(state: AuthApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(signup))
        .routes(routes!(login))
        .routes(routes!(federated_signin))
        .with_state(state)
}
