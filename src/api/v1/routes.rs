/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - どの route にどの guard を掛けるかをここで決める (route_layer 単位)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::pages::{
    admin_page, index, me, protected_page, role_protected_page, user_protected_page,
};
use crate::config::Config;
use crate::middleware::auth::{Guard, protect};
use crate::state::AppState;

pub fn routes(state: &AppState, config: &Config) -> Router<AppState> {
    let admin = state.admin_role.clone();

    Router::new()
        .route("/", get(index))
        .route(
            "/protected",
            protect(get(protected_page), Guard::Authenticated, admin.clone()),
        )
        .route(
            "/role-protected",
            protect(
                get(role_protected_page),
                Guard::role(config.developer_role_name.clone()),
                admin.clone(),
            ),
        )
        .route("/admin", protect(get(admin_page), Guard::Admin, admin.clone()))
        .route(
            "/user-protected",
            protect(
                get(user_protected_page),
                Guard::user(config.protected_username.clone()),
                admin.clone(),
            ),
        )
        .route("/me", protect(get(me), Guard::Authenticated, admin))
}
