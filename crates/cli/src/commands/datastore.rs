use std::io::{self, Write};

use serde::{Serialize, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use vmctl::DatastoreBrowser;
use vmctl::protocol::{FILE_NOT_FOUND, FileQueryFlags, SearchResults, SearchSpec};

use crate::cli::LsArgs;
use crate::context::InvocationContext;
use crate::error::{Result, VmctlError};
use crate::output::TextOutput;

/// Search results in argument order, already filtered for display.
#[derive(Debug)]
pub struct Listing {
	long: bool,
	results: Vec<SearchResults>,
}

impl Serialize for Listing {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		self.results.serialize(serializer)
	}
}

pub async fn ls(ctx: &InvocationContext, args: &LsArgs) -> Result<Listing> {
	let datastore = ctx.datastore()?.to_string();
	let browser = DatastoreBrowser::new(ctx.client().await?, datastore);

	let mut listing = Listing {
		long: args.long,
		results: Vec::new(),
	};
	let paths: Vec<&str> = match args.files.as_slice() {
		[] => vec![""],
		files => files.iter().map(String::as_str).collect(),
	};
	for path in paths {
		let spec = SearchSpec {
			match_pattern: vec!["*".to_string()],
			details: args.long.then(FileQueryFlags::all),
		};
		let results = list_path(&browser, path, spec).await?;
		listing.add(results, args);
	}
	Ok(listing)
}

/// Searches `path` as a directory. When it does not exist, searches its
/// parent with the last component as the match pattern instead.
async fn list_path(browser: &DatastoreBrowser<'_>, path: &str, mut spec: SearchSpec) -> Result<SearchResults> {
	match browser.search(path, &spec).await {
		Ok(results) => Ok(results),
		Err(err) if err.is_fault(FILE_NOT_FOUND) => {
			let (dir, pattern) = split_last(path);
			spec.match_pattern = vec![pattern.to_string()];
			let results = browser.search(dir, &spec).await?;
			if results.file.is_empty() {
				return Err(VmctlError::NotFound(format!(
					"File {}/{} was not found",
					results.folder_path, pattern
				)));
			}
			Ok(results)
		}
		Err(err) => Err(err.into()),
	}
}

/// Splits `path` into parent directory and last component; the parent of
/// a single component is the datastore root.
fn split_last(path: &str) -> (&str, &str) {
	let trimmed = path.trim_end_matches('/');
	match trimmed.rfind('/') {
		Some(index) => (trimmed[..index].trim_end_matches('/'), &trimmed[index + 1..]),
		None => ("", trimmed),
	}
}

impl Listing {
	fn add(&mut self, mut results: SearchResults, args: &LsArgs) {
		results.file.retain(|file| args.all || !file.path.starts_with('.'));
		if args.slash {
			for file in results.file.iter_mut().filter(|file| file.is_folder) {
				file.path.push('/');
			}
		}
		self.results.push(results);
	}

	pub fn results(&self) -> &[SearchResults] {
		&self.results
	}

	fn spans_folders(&self) -> bool {
		match self.results.split_first() {
			Some((first, rest)) => rest.iter().any(|r| r.folder_path != first.folder_path),
			None => false,
		}
	}
}

impl TextOutput for Listing {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		let header = self.spans_folders();
		let mut table = Table::default();
		for (i, results) in self.results.iter().enumerate() {
			if header {
				if i > 0 {
					table.line(String::new());
				}
				table.line(format!("{}:", results.folder_path));
			}
			for file in &results.file {
				if self.long {
					let modified = file.modification.as_deref().map(modification).unwrap_or_default();
					table.row([byte_size(file.file_size), modified], file.path.clone());
				} else {
					table.line(file.path.clone());
				}
			}
		}
		table.write(out)
	}
}

/// Human-readable size in binary units with one decimal.
pub fn byte_size(bytes: u64) -> String {
	const UNITS: [(&str, u64); 4] = [("TB", 1 << 40), ("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];
	for (suffix, unit) in UNITS {
		if bytes >= unit {
			return format!("{:.1}{suffix}", bytes as f64 / unit as f64);
		}
	}
	format!("{bytes}B")
}

/// Renders an RFC 3339 timestamp as `Mon Jan 2 15:04:05 2006`.
fn modification(raw: &str) -> String {
	let format = format_description!("[weekday repr:short] [month repr:short] [day padding:none] [hour]:[minute]:[second] [year]");
	OffsetDateTime::parse(raw, &Rfc3339)
		.ok()
		.and_then(|stamp| stamp.format(&format).ok())
		.unwrap_or_else(|| raw.to_string())
}

enum Line {
	Text(String),
	Row([String; 2], String),
}

/// Aligns consecutive rows; a text line ends the run.
#[derive(Default)]
struct Table {
	lines: Vec<Line>,
}

impl Table {
	const PADDING: usize = 2;
	const MIN_WIDTH: usize = 3;

	fn line(&mut self, text: String) {
		self.lines.push(Line::Text(text));
	}

	fn row(&mut self, cells: [String; 2], last: String) {
		self.lines.push(Line::Row(cells, last));
	}

	fn write(&self, out: &mut dyn Write) -> io::Result<()> {
		let mut start = 0;
		while start < self.lines.len() {
			let run = self.lines[start..]
				.iter()
				.take_while(|line| matches!(line, Line::Row(..)))
				.count();
			if run == 0 {
				if let Line::Text(text) = &self.lines[start] {
					writeln!(out, "{text}")?;
				}
				start += 1;
				continue;
			}

			let rows = &self.lines[start..start + run];
			let mut widths = [Self::MIN_WIDTH; 2];
			for line in rows {
				if let Line::Row(cells, _) = line {
					for (width, cell) in widths.iter_mut().zip(cells) {
						*width = (*width).max(cell.len() + Self::PADDING);
					}
				}
			}
			for line in rows {
				if let Line::Row([size, modified], last) = line {
					writeln!(out, "{size:<w0$}{modified:<w1$}{last}", w0 = widths[0], w1 = widths[1])?;
				}
			}
			start += run;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use vmctl::protocol::FileInfo;

	use super::*;
	use crate::config::InventorySelection;
	use crate::testing::{FakeServer, config, invocation};

	fn file(path: &str, is_folder: bool, size: u64) -> FileInfo {
		FileInfo {
			path: path.to_string(),
			is_folder,
			file_size: size,
			modification: Some("2015-03-04T10:20:30Z".to_string()),
			owner: None,
		}
	}

	fn results(folder: &str, files: Vec<FileInfo>) -> SearchResults {
		SearchResults {
			folder_path: folder.to_string(),
			file: files,
		}
	}

	fn context(server: &std::sync::Arc<FakeServer>) -> InvocationContext {
		server.add_user("root", "vmware");
		let inventory = InventorySelection {
			folder: None,
			datastore: Some("ds1".into()),
		};
		invocation(server, config("root:vmware@esx", &[]), inventory)
	}

	fn text(listing: &Listing) -> String {
		let mut out = Vec::new();
		listing.write_text(&mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	fn args(files: &[&str]) -> LsArgs {
		LsArgs {
			files: files.iter().map(|f| f.to_string()).collect(),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn lists_root_and_hides_dot_files() {
		let server = FakeServer::new("6.0");
		server.add_search(
			"[ds1] ",
			Ok(results("[ds1]", vec![file("vm", true, 0), file(".sdd.sf", true, 0), file("iso", true, 0)])),
		);
		let ctx = context(&server);

		let listing = ls(&ctx, &args(&[])).await.unwrap();
		assert_eq!(text(&listing), "vm\niso\n");

		let all = ls(&ctx, &LsArgs { all: true, slash: true, ..args(&[]) }).await.unwrap();
		assert_eq!(text(&all), "vm/\n.sdd.sf/\niso/\n");
	}

	#[tokio::test]
	async fn missing_directory_is_retried_as_pattern() {
		let server = FakeServer::new("6.0");
		server.add_search("[ds1] vm/web", Err(FILE_NOT_FOUND));
		server.add_search("[ds1] vm", Ok(results("[ds1] vm", vec![file("web.vmx", false, 3)])));
		let ctx = context(&server);

		let listing = ls(&ctx, &args(&["vm/web"])).await.unwrap();
		assert_eq!(listing.results()[0].file[0].path, "web.vmx");
		assert_eq!(server.count("searchDatastore"), 2);
	}

	#[tokio::test]
	async fn empty_pattern_result_is_not_found() {
		let server = FakeServer::new("6.0");
		server.add_search("[ds1] vm", Ok(results("[ds1] vm", vec![])));
		let ctx = context(&server);

		let err = ls(&ctx, &args(&["vm/gone.vmx"])).await.unwrap_err();
		assert_eq!(err.to_string(), "File [ds1] vm/gone.vmx was not found");
	}

	#[tokio::test]
	async fn second_not_found_is_not_retried_again() {
		let server = FakeServer::new("6.0");
		let ctx = context(&server);

		let err = ls(&ctx, &args(&["a/b/c"])).await.unwrap_err();
		assert!(matches!(err, VmctlError::Api(ref inner) if inner.is_fault(FILE_NOT_FOUND)));
		assert_eq!(server.count("searchDatastore"), 2);
	}

	#[tokio::test]
	async fn header_only_when_folders_differ() {
		let server = FakeServer::new("6.0");
		server.add_search("[ds1] vm", Ok(results("[ds1] vm", vec![file("a", false, 1)])));
		server.add_search("[ds1] iso", Ok(results("[ds1] iso", vec![file("b.iso", false, 1)])));
		let ctx = context(&server);

		let listing = ls(&ctx, &args(&["vm", "iso"])).await.unwrap();
		assert_eq!(text(&listing), "[ds1] vm:\na\n\n[ds1] iso:\nb.iso\n");

		let same = ls(&ctx, &args(&["vm", "vm"])).await.unwrap();
		assert_eq!(text(&same), "a\na\n");
	}

	#[tokio::test]
	async fn long_listing_aligns_columns() {
		let server = FakeServer::new("6.0");
		server.add_search(
			"[ds1] vm",
			Ok(results("[ds1] vm", vec![file("web.vmdk", false, 10 << 30), file("web.vmx", false, 900)])),
		);
		let ctx = context(&server);

		let listing = ls(&ctx, &LsArgs { long: true, ..args(&["vm"]) }).await.unwrap();
		assert_eq!(
			text(&listing),
			"10.0GB  Wed Mar 4 10:20:30 2015  web.vmdk\n\
			 900B    Wed Mar 4 10:20:30 2015  web.vmx\n"
		);
	}

	#[tokio::test]
	async fn datastore_is_required() {
		let server = FakeServer::new("6.0");
		let ctx = invocation(&server, config("esx", &[]), Default::default());
		let err = ls(&ctx, &args(&[])).await.unwrap_err();
		assert!(matches!(err, VmctlError::InvalidConfig(_)));
		assert!(server.calls().is_empty());
	}

	#[test]
	fn byte_sizes() {
		assert_eq!(byte_size(0), "0B");
		assert_eq!(byte_size(1023), "1023B");
		assert_eq!(byte_size(1536), "1.5KB");
		assert_eq!(byte_size(5 << 20), "5.0MB");
		assert_eq!(byte_size(3 << 40), "3.0TB");
	}

	#[test]
	fn split_last_component() {
		assert_eq!(split_last("vm/web.vmx"), ("vm", "web.vmx"));
		assert_eq!(split_last("a/b/c/"), ("a/b", "c"));
		assert_eq!(split_last("web.vmx"), ("", "web.vmx"));
	}

	#[test]
	fn unparseable_modification_is_kept() {
		assert_eq!(modification("yesterday"), "yesterday");
	}
}
