//! Datastore browser search types.

use serde::{Deserialize, Serialize};

/// Optional details requested for each matched file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQueryFlags {
	pub file_type: bool,
	pub file_size: bool,
	pub file_owner: bool,
	pub modification: bool,
}

impl FileQueryFlags {
	/// Every detail the long listing prints.
	pub fn all() -> Self {
		Self {
			file_type: true,
			file_size: true,
			file_owner: true,
			modification: true,
		}
	}
}

/// Search specification for `searchDatastore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSpec {
	/// Glob patterns matched against file names.
	pub match_pattern: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub details: Option<FileQueryFlags>,
}

impl Default for SearchSpec {
	fn default() -> Self {
		Self {
			match_pattern: vec!["*".to_string()],
			details: None,
		}
	}
}

/// Parameters for `searchDatastore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDatastoreParams {
	/// Datastore path in `[datastore] dir/file` form.
	pub datastore_path: String,
	pub search_spec: SearchSpec,
}

/// A single matched file or folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
	pub path: String,
	#[serde(default)]
	pub is_folder: bool,
	#[serde(default)]
	pub file_size: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub modification: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner: Option<String>,
}

/// Matches found below one folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
	/// Folder searched, in `[datastore] dir` form.
	pub folder_path: String,
	#[serde(default)]
	pub file: Vec<FileInfo>,
}
