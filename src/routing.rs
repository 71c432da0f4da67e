//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::{
    ApiMessage, AppState, endpoints,
    logging::logging_middleware,
    transaction::{
        add_transaction_endpoint, delete_transaction_endpoint, delete_transactions_endpoint,
        list_transactions_endpoint, transaction_detail_endpoint, update_transaction_endpoint,
    },
    user::{all_users_endpoint, log_in_endpoint, register_endpoint, set_avatar_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ADD_TRANSACTION, post(add_transaction_endpoint))
        .route(endpoints::GET_TRANSACTIONS, post(list_transactions_endpoint))
        .route(
            endpoints::TRANSACTION_DETAIL,
            get(transaction_detail_endpoint),
        )
        .route(
            endpoints::UPDATE_TRANSACTION,
            put(update_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            post(delete_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_MULTIPLE_TRANSACTIONS,
            post(delete_transactions_endpoint),
        )
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::SET_AVATAR, post(set_avatar_endpoint))
        .route(endpoints::ALL_USERS, get(all_users_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .fallback(get_route_not_found)
        .with_state(state)
}

/// The JSON 404 response for unknown routes.
async fn get_route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiMessage {
            success: false,
            message: "Route not found".to_owned(),
        }),
    )
        .into_response()
}

// ============================================================================
// TESTS
// ============================================================================
