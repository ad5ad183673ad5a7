//! Inventory lookups.

use vmctl_protocol::{FindByInventoryPathParams, ManagedObjectRef};

use crate::client::Client;
use crate::error::Result;

pub const FIND_BY_INVENTORY_PATH: &str = "findByInventoryPath";

/// Inventory folder resolved for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
	pub reference: ManagedObjectRef,
	/// Inventory path, `/` for the root folder.
	pub inventory_path: String,
}

impl Folder {
	/// Root folder advertised in the client's service content.
	pub fn root(client: &Client) -> Self {
		Self {
			reference: client.service_content().root_folder.clone(),
			inventory_path: "/".to_string(),
		}
	}
}

/// Resolves inventory paths to managed object references.
pub struct Finder<'a> {
	client: &'a Client,
}

impl<'a> Finder<'a> {
	pub fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Looks up the object at `inventory_path`.
	pub async fn find(&self, inventory_path: &str) -> Result<Option<ManagedObjectRef>> {
		let params = FindByInventoryPathParams {
			inventory_path: inventory_path.to_string(),
		};
		self.client.call(FIND_BY_INVENTORY_PATH, params).await
	}

	/// Looks up a folder; objects of another type yield `None`.
	pub async fn folder(&self, inventory_path: &str) -> Result<Option<Folder>> {
		Ok(self.find(inventory_path).await?.filter(|r| r.kind == "Folder").map(|reference| Folder {
			reference,
			inventory_path: inventory_path.to_string(),
		}))
	}
}
