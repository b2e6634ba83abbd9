pub(crate) mod api;
pub(crate) mod config;
pub(crate) mod dicom;
pub(crate) mod store;
pub(crate) mod types;

use crate::config::{AppConfig, HttpServerConfig};
use crate::store::WorklistStore;
use axum::extract::Request;
use axum::response::Response;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace;
use tracing::{info, level_filters::LevelFilter, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// The implementation class UID written into the file meta group of every worklist file.
/// This is the UID the original dcmjs-based generator registered under the 1.2.826 root.
pub const IMPLEMENTATION_CLASS_UID: &str = "1.2.826.0.1.3680043.8.498.1";

/// The implementation version name for mwl-server.
/// Must stay within the 16 character limit of the SH value representation.
pub const IMPLEMENTATION_VERSION_NAME: &str = concat!("MWL-RS ", env!("CARGO_PKG_VERSION"));

fn init_logger(level: &str) {
	let directive = level
		.parse()
		.unwrap_or_else(|_| LevelFilter::INFO.into());
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer()
				.compact()
				.with_ansi(true)
				.with_file(false)
				.with_line_number(false)
				.with_target(false),
		)
		.with(
			EnvFilter::builder()
				.with_default_directive(directive)
				.from_env_lossy(),
		)
		.init();
}

#[derive(Clone)]
pub struct AppState {
	pub config: AppConfig,
	/// The worklist store behind an async mutex.
	/// Store operations are serialized here; the store itself carries no locking discipline.
	pub store: Arc<Mutex<WorklistStore>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = AppConfig::new()?;
	init_logger(&config.telemetry.level);
	run(config).await
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
	let store = WorklistStore::new(&config.storage.worklist_dir).await?;
	info!(
		"Serving worklist files from {}",
		config.storage.worklist_dir.display()
	);

	let app_state = AppState {
		config: config.clone(),
		store: Arc::new(Mutex::new(store)),
	};

	let app = api::routes()
		.layer(CorsLayer::permissive())
		.layer(axum::middleware::from_fn(add_common_headers))
		.layer(
			tower_http::trace::TraceLayer::new_for_http()
				.make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
				.on_request(trace::DefaultOnRequest::new().level(Level::INFO))
				.on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
		)
		.layer(TimeoutLayer::new(Duration::from_secs(
			config.http.request_timeout,
		)))
		.with_state(app_state);

	let HttpServerConfig {
		interface: host,
		port,
		..
	} = config.http;
	let addr = SocketAddr::from((host, port));
	let listener = TcpListener::bind(addr).await?;

	info!("Started modality worklist server on http://{addr}");
	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async { signal::ctrl_c().await.unwrap() };

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.unwrap()
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}

async fn add_common_headers(req: Request, next: axum::middleware::Next) -> Response {
	let mut response = next.run(req).await;
	let server_name = concat!("mwl-server/", env!("CARGO_PKG_VERSION"));
	let headers = response.headers_mut();
	headers.insert("Server", axum::http::HeaderValue::from_static(server_name));
	response
}
