//! Datastore file searches.

use vmctl_protocol::{SearchDatastoreParams, SearchResults, SearchSpec};

use crate::client::Client;
use crate::error::Result;

pub const SEARCH_DATASTORE: &str = "searchDatastore";

/// Browses files on one datastore.
pub struct DatastoreBrowser<'a> {
	client: &'a Client,
	datastore: String,
}

impl<'a> DatastoreBrowser<'a> {
	pub fn new(client: &'a Client, datastore: impl Into<String>) -> Self {
		Self {
			client,
			datastore: datastore.into(),
		}
	}

	pub fn datastore(&self) -> &str {
		&self.datastore
	}

	/// Formats `path` as `[datastore] path`.
	pub fn datastore_path(&self, path: &str) -> String {
		format!("[{}] {}", self.datastore, path)
	}

	/// Searches the directory `path` for entries matching `spec`.
	pub async fn search(&self, path: &str, spec: &SearchSpec) -> Result<SearchResults> {
		let params = SearchDatastoreParams {
			datastore_path: self.datastore_path(path),
			search_spec: spec.clone(),
		};
		self.client.call(SEARCH_DATASTORE, params).await
	}
}
