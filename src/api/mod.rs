//! HTTP surface of the worklist server.

pub mod worklist;

use crate::AppState;
use axum::routing::get;
use axum::Router;

#[rustfmt::skip]
pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/health", get(worklist::health))
		.nest("/api", worklist::routes())
}
