//! Users API handlers.
//!
//! ```text
//! POST /api/users {"name":"Ana","email":"ana@example.com"}
//! GET /api/users/1
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::correlated_span;
use crate::domain::ports::CreateUserRequest;
use crate::domain::{Error, UserId, UserProfile, UserValidationError};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;
use crate::observability::in_span;

/// Request body for `POST /api/users`.
///
/// Missing fields decode as empty strings and are rejected by the use case,
/// so clients see the same message for absent and blank values.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserBody {
    #[serde(default)]
    #[schema(example = "Ana")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "ana@example.com")]
    pub email: String,
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        Self {
            name: body.name,
            email: body.email,
        }
    }
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ana")]
    pub name: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id.get(),
            name: profile.name,
            email: profile.email,
        }
    }
}

fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    raw.parse::<UserId>().map_err(|err| match err {
        UserValidationError::IdOutOfRange => {
            Error::not_found("User not found").with_meta("id", raw)
        }
        other => {
            warn!(id = raw, error = %other, "rejected user id");
            Error::bad_request("Invalid user ID").with_meta("id", raw)
        }
    })
}

/// Register a user.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use users_api::inbound::http::users::create_user;
///
/// let app = App::new().service(web::scope("/api").service(create_user));
/// ```
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing name or email, or malformed body", body = ErrorEnvelope),
        (status = 422, description = "Email already in use", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let span = correlated_span!("handler", otel.name = "UserController.Create");
    let request = CreateUserRequest::from(payload.into_inner());
    let profile = in_span(span, state.user_commands.create_user(request)).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(profile)))
}

/// Fetch a user by numeric id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid user ID", body = ErrorEnvelope),
        (status = 404, description = "User not found", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let span = correlated_span!("handler", otel.name = "UserController.Get", user.id = path.as_str());
    let id = parse_user_id(&path)?;
    let profile = in_span(span, state.user_queries.get_user(id)).await?;
    Ok(web::Json(UserResponse::from(profile)))
}
