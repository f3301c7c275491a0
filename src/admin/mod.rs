pub mod auth;
pub mod form;
pub mod handlers;

use axum::{
    middleware,
    routing::get,
    Router,
};
use crate::http::server::AppState;
use self::handlers::*;
use self::auth::admin_auth_middleware;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route(
            "/admin/xframe",
            get(get_policy).post(submit_form).put(submit_json),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
