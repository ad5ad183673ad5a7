use std::io::{self, Write};

use serde::Serialize;

use crate::context::InvocationContext;
use crate::error::Result;
use crate::output::TextOutput;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInfo {
	pub path: String,
	#[serde(rename = "type")]
	pub kind: String,
	pub value: String,
}

pub async fn info(ctx: &InvocationContext) -> Result<FolderInfo> {
	let folder = ctx.folder_or_root().await?;
	Ok(FolderInfo {
		path: folder.inventory_path.clone(),
		kind: folder.reference.kind.clone(),
		value: folder.reference.value.clone(),
	})
}

impl TextOutput for FolderInfo {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		writeln!(out, "Path:       {}", self.path)?;
		writeln!(out, "Reference:  {}:{}", self.kind, self.value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::InventorySelection;
	use crate::testing::{FakeServer, config, invocation};

	#[tokio::test]
	async fn named_folder_info() {
		let server = FakeServer::new("6.0");
		server.add_user("root", "vmware");
		server.add_folder("/dc1/vm", "group-v3");
		let inventory = InventorySelection {
			folder: Some("/dc1/vm".into()),
			datastore: None,
		};
		let ctx = invocation(&server, config("root:vmware@esx", &[]), inventory);

		let info = info(&ctx).await.unwrap();
		let mut out = Vec::new();
		info.write_text(&mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "Path:       /dc1/vm\nReference:  Folder:group-v3\n");
	}

	#[tokio::test]
	async fn root_folder_without_selection() {
		let server = FakeServer::new("6.0");
		server.add_user("root", "vmware");
		let ctx = invocation(&server, config("root:vmware@esx", &[]), Default::default());

		let info = info(&ctx).await.unwrap();
		assert_eq!(info.path, "/");
		assert_eq!(info.value, "ha-folder-root");
	}
}
