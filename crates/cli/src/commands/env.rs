use std::io::{self, Write};

use serde::Serialize;

use crate::config::ConnectionConfig;
use crate::env::environ_pairs;
use crate::output::TextOutput;

/// `KEY=VALUE` lines in evaluation order.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct EnvOutput(Vec<String>);

pub fn execute(config: &ConnectionConfig, extra: bool) -> EnvOutput {
	EnvOutput(environ_pairs(config, extra))
}

impl TextOutput for EnvOutput {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		for pair in &self.0 {
			writeln!(out, "{pair}")?;
		}
		Ok(())
	}
}
