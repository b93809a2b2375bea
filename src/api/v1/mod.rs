//! Version 1 API endpoints

pub mod users;

use axum::{routing::{get, post}, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
