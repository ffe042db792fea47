//! HTTP request handlers for the fitrack server

use bytes::Bytes;
use fitrack_core::{Email, FitnessProfile, ProfileDraft, ProfileUpdate, UserId};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::gate::authorize;
use crate::server::json_response;
use crate::state::AppState;

/// Request bodies larger than this are rejected with 413
pub const MAX_BODY_BYTES: usize = 64 * 1024;

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

/// Main request handler
pub async fn handle_request<B>(
    req: Request<B>,
    state: AppState,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Handling {} {}", method, path);

    let result = match (&method, path.as_str()) {
        (&Method::GET, "/health") => Ok(handle_health()),

        // Public auth endpoints
        (&Method::POST, "/api/v1/auth/signup") => handle_signup(req, &state).await,
        (&Method::POST, "/api/v1/auth/signin") => handle_signin(req, &state).await,

        // Protected profile endpoints
        (&Method::POST, "/api/v1/auth/create-profile") => {
            handle_create_profile(req, &state).await
        }
        (&Method::PUT, "/api/v1/auth/update-profile") => {
            handle_update_profile(req, &state).await
        }
        (&Method::GET, "/api/v1/auth/get-profile") => handle_get_profile(req, &state).await,

        _ => Err(ApiError::not_found("Not found")),
    };

    let response = result.unwrap_or_else(ApiError::into_response);
    info!("{} {} -> {}", method, path, response.status());
    Ok(response)
}

fn handle_health() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "service": "fitrack",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

#[derive(Deserialize)]
struct SignupRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

async fn handle_signup<B>(req: Request<B>, state: &AppState) -> HandlerResult
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: SignupRequest = read_json(req.into_body()).await?;

    let (Some(name), Some(email), Some(password)) = (
        filled(body.name),
        filled(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let email = Email::new(&email)?;
    let storage = state.storage.clone();
    let lookup = email.clone();
    if blocking(move || storage.users().find_by_email(&lookup)).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let hasher = state.hasher.clone();
    let credential = blocking(move || hasher.hash(&password)).await?;

    let storage = state.storage.clone();
    let user = blocking(move || storage.users().create(name.trim(), &email, credential)).await?;

    info!(user_id = %user.id, "user registered");
    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "User registered successfully" }),
    ))
}

#[derive(Deserialize)]
struct SigninRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct SigninResponse {
    message: &'static str,
    token: String,
    #[serde(rename = "_id")]
    id: UserId,
}

async fn handle_signin<B>(req: Request<B>, state: &AppState) -> HandlerResult
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: SigninRequest = read_json(req.into_body()).await?;

    let (Some(email), Some(password)) =
        (filled(body.email), body.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::bad_request("Missing credentials"));
    };

    let user = match Email::new(&email) {
        Ok(email) => {
            let storage = state.storage.clone();
            blocking(move || storage.users().find_by_email(&email)).await?
        }
        Err(_) => None,
    };

    // Unknown emails still pay for one derivation.
    let stored = match &user {
        Some(user) => user.credential.clone(),
        None => state.dummy_credential.to_string(),
    };
    let hasher = state.hasher.clone();
    let matched = blocking(move || hasher.compare(&password, &stored)).await?;

    let user = match user {
        Some(user) if matched => user,
        _ => {
            debug!("signin rejected");
            return Err(ApiError::new(
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ));
        }
    };

    let issued = state.authorizer.issue(&user.id.to_string())?;

    info!(user_id = %user.id, "user signed in");
    Ok(json_response(
        StatusCode::OK,
        &SigninResponse {
            message: "Signin successful",
            token: issued.token,
            id: user.id,
        },
    ))
}

#[derive(Serialize)]
struct ProfileResponse<'a> {
    message: &'static str,
    profile: &'a FitnessProfile,
}

#[derive(Serialize)]
struct UpdatedProfileResponse<'a> {
    message: &'static str,
    #[serde(rename = "updatedProfile")]
    updated_profile: &'a FitnessProfile,
}

async fn handle_create_profile<B>(req: Request<B>, state: &AppState) -> HandlerResult
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let user_id = authorize(req.headers(), &state.authorizer)?;
    let draft: ProfileDraft = read_json(req.into_body()).await?;

    let missing = draft.missing_fields();
    if !missing.is_empty() {
        debug!(user_id = %user_id, "profile missing fields: {}", missing.join(", "));
        return Err(ApiError::bad_request(
            "Missing required fields. Please ensure all fields are provided.",
        ));
    }

    let new_profile = draft.validate()?;
    let storage = state.storage.clone();
    let profile = blocking(move || storage.profiles().create(&user_id, new_profile)).await?;

    info!(user_id = %user_id, "profile created");
    Ok(json_response(
        StatusCode::OK,
        &ProfileResponse {
            message: "Profile created successfully",
            profile: &profile,
        },
    ))
}

async fn handle_update_profile<B>(req: Request<B>, state: &AppState) -> HandlerResult
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let user_id = authorize(req.headers(), &state.authorizer)?;
    let update: ProfileUpdate = read_json(req.into_body()).await?;

    let storage = state.storage.clone();
    let profile = blocking(move || storage.profiles().update(&user_id, update)).await?;

    info!(user_id = %user_id, "profile updated");
    Ok(json_response(
        StatusCode::OK,
        &UpdatedProfileResponse {
            message: "Profile updated successfully",
            updated_profile: &profile,
        },
    ))
}

async fn handle_get_profile<B>(req: Request<B>, state: &AppState) -> HandlerResult {
    let user_id = authorize(req.headers(), &state.authorizer)?;

    let storage = state.storage.clone();
    let profile = blocking(move || storage.profiles().get(&user_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found."))?;

    Ok(json_response(
        StatusCode::OK,
        &ProfileResponse {
            message: "Profile fetched successfully",
            profile: &profile,
        },
    ))
}

/// Read a size-capped body and parse it as JSON
async fn read_json<T, B>(body: B) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(ApiError::payload_too_large());
        }
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            return Err(ApiError::bad_request("Could not read request body"));
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        debug!("Malformed JSON body: {}", e);
        ApiError::bad_request("Malformed JSON body")
    })
}

/// Run KDF work and synced storage writes on the blocking pool
async fn blocking<F, T, E>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("blocking task failed: {}", e);
            ApiError::internal()
        })?
        .map_err(Into::into)
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
