use std::io::{self, Write};

use vmctl::protocol::AboutInfo;

use crate::context::InvocationContext;
use crate::error::Result;
use crate::output::TextOutput;

pub async fn execute(ctx: &InvocationContext) -> Result<AboutInfo> {
	Ok(ctx.session().await?.about().clone())
}

impl TextOutput for AboutInfo {
	fn write_text(&self, out: &mut dyn Write) -> io::Result<()> {
		writeln!(out, "Name:         {}", self.name)?;
		writeln!(out, "Vendor:       {}", self.vendor)?;
		writeln!(out, "Version:      {}", self.version)?;
		writeln!(out, "Build:        {}", self.build)?;
		writeln!(out, "API type:     {}", self.api_type)?;
		writeln!(out, "API version:  {}", self.api_version)?;
		if let Some(uuid) = &self.instance_uuid {
			writeln!(out, "UUID:         {uuid}")?;
		}
		Ok(())
	}
}
