use serde::Deserialize;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
	pub telemetry: TelemetryConfig,
	pub http: HttpServerConfig,
	pub storage: StorageConfig,
}

impl AppConfig {
	/// Loads the configuration from the embedded defaults, an optional `config.toml`
	/// next to the binary and `MWL_*` environment variables, in that order of precedence.
	///
	/// The environment separator is `__` so that fields with underscores in
	/// their names stay addressable, e.g. `MWL_STORAGE__WORKLIST_DIR`.
	pub fn new() -> Result<Self, config::ConfigError> {
		use config::Config;
		let s = Config::builder()
			.add_source(config::File::from_str(
				include_str!("defaults.toml"),
				config::FileFormat::Toml,
			))
			.add_source(config::File::with_name("config.toml").required(false))
			.add_source(
				config::Environment::with_prefix("MWL")
					.prefix_separator("_")
					.separator("__"),
			)
			.build()?;

		s.try_deserialize()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
	/// Configurable logging level. Also configurable via the RUST_LOG env var.
	pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
	/// The interface the worklist server will be listening on.
	pub interface: IpAddr,
	/// The port for the worklist server.
	pub port: u16,
	/// Request timeout in seconds.
	pub request_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
	/// The directory holding the persisted `.wl` files.
	/// Created at startup if it does not exist.
	pub worklist_dir: PathBuf,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_load() {
		let config = AppConfig::new().unwrap();
		assert_eq!(config.http.port, 8092);
		assert_eq!(config.http.request_timeout, 60);
	}

	#[test]
	fn environment_overrides_underscored_fields() {
		std::env::set_var("MWL_STORAGE__WORKLIST_DIR", "/srv/worklists");
		let config = AppConfig::new().unwrap();
		std::env::remove_var("MWL_STORAGE__WORKLIST_DIR");
		assert_eq!(config.storage.worklist_dir, PathBuf::from("/srv/worklists"));
	}
}
