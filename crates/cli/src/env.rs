//! `KEY=VALUE` rendering of a resolved connection.

use crate::config::{ConnectionConfig, DEFAULT_PATH, ENV_PASSWORD, ENV_URL, ENV_USERNAME};

pub const ENV_URL_SCHEME: &str = "VMCTL_URL_SCHEME";
pub const ENV_URL_HOST: &str = "VMCTL_URL_HOST";
pub const ENV_URL_PORT: &str = "VMCTL_URL_PORT";
pub const ENV_URL_PATH: &str = "VMCTL_URL_PATH";
pub const ENV_URL_FRAGMENT: &str = "VMCTL_URL_FRAGMENT";
pub const ENV_URL_QUERY: &str = "VMCTL_URL_QUERY";

/// Environment pairs that reproduce `config`, credentials included.
///
/// Order: credentials, the short URL, every other setting that was given
/// explicitly, then with `include_extra` the URL's components.
pub fn environ_pairs(config: &ConnectionConfig, include_extra: bool) -> Vec<String> {
	let mut pairs = Vec::new();
	let mut add = |key: &str, value: &str| pairs.push(format!("{key}={value}"));

	if !config.username.is_empty() || config.password.is_some() {
		add(ENV_USERNAME, &config.username);
		if let Some(password) = &config.password {
			add(ENV_PASSWORD, password);
		}
	}

	add(ENV_URL, &short_url(config));

	for &(key, ref value) in config.settings() {
		add(key, value.as_str());
	}

	if include_extra {
		let url = &config.url;
		add(ENV_URL_SCHEME, url.scheme());
		add(ENV_URL_HOST, url.host_str().unwrap_or_default());
		if let Some(port) = config.port() {
			add(ENV_URL_PORT, &port.to_string());
		}
		add(ENV_URL_PATH, url.path());
		if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
			add(ENV_URL_FRAGMENT, fragment);
		}
		if let Some(query) = url.query().filter(|q| !q.is_empty()) {
			add(ENV_URL_QUERY, query);
		}
	}

	pairs
}

/// Endpoint without credentials, query, fragment, the default path, or an
/// `https://` prefix.
fn short_url(config: &ConnectionConfig) -> String {
	let url = &config.url;
	let mut rendered = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
	if let Some(port) = config.port() {
		rendered.push_str(&format!(":{port}"));
	}
	if url.path() != DEFAULT_PATH && url.path() != "/" {
		rendered.push_str(url.path());
	}
	match rendered.strip_prefix("https://") {
		Some(rest) => rest.to_string(),
		None => rendered,
	}
}
