mod health;
mod login;
mod register;
mod users;
mod verify;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{AppState, middleware::auth_middleware};

pub fn create_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users", get(users::get_all))
        .route("/users/me", get(users::logged_user))
        .route(
            "/users/{id}",
            get(users::get_one).put(users::update).delete(users::remove),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/users", post(register::register_user))
        .route("/users/login", post(login::login_user))
        .route("/users/verify/resend", post(verify::resend_verification))
        .route("/users/verify/{code}", get(verify::verify_user_code))
        .merge(protected)
}
