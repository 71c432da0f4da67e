//! Defines the endpoint for setting a user's avatar image.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::UserId};

use super::core::set_avatar;

/// The state needed to set an avatar.
#[derive(Debug, Clone)]
pub struct SetAvatarState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SetAvatarState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for setting an avatar.
#[derive(Debug, Deserialize)]
pub struct SetAvatarRequest {
    /// The avatar image, typically a data URI.
    pub image: Option<String>,
}

/// The response body for a successful avatar change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvatarResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// Whether the user now has an avatar. Always true on success.
    pub is_set: bool,
    /// The stored avatar image.
    pub image: String,
}

/// A route handler for setting a user's avatar image.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn set_avatar_endpoint(
    State(state): State<SetAvatarState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<SetAvatarRequest>,
) -> Response {
    let Some(image) = request.image.filter(|image| !image.is_empty()) else {
        return Error::MissingParameters("Image is required").into_response();
    };

    let connection = state.db_connection.lock().unwrap();

    match set_avatar(user_id, &image, &connection) {
        Ok(user) => Json(SetAvatarResponse {
            success: true,
            is_set: user.is_avatar_image_set,
            image: user.avatar_image,
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        database_id::UserId,
        db::initialize,
        transaction::test_utils::create_test_user,
        user::get_user_by_id,
    };

    use super::{SetAvatarRequest, SetAvatarState, set_avatar_endpoint};

    fn get_test_state() -> (SetAvatarState, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_test_user("alice@example.com", &conn);

        (
            SetAvatarState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn sets_avatar() {
        let (state, user_id) = get_test_state();

        let response = set_avatar_endpoint(
            State(state.clone()),
            Path(user_id),
            Json(SetAvatarRequest {
                image: Some("data:image/svg+xml;base64,PHN2Zz4=".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_id(user_id, &connection).unwrap();
        assert!(user.is_avatar_image_set);
        assert_eq!(user.avatar_image, "data:image/svg+xml;base64,PHN2Zz4=");
    }

    #[tokio::test]
    async fn missing_image_returns_bad_request() {
        let (state, user_id) = get_test_state();

        let response = set_avatar_endpoint(
            State(state),
            Path(user_id),
            Json(SetAvatarRequest { image: None }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_user_returns_bad_request() {
        let (state, user_id) = get_test_state();

        let response = set_avatar_endpoint(
            State(state),
            Path(user_id + 1),
            Json(SetAvatarRequest {
                image: Some("image".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
