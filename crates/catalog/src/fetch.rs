//! Transfer backends for the catalog.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{CatalogError, Result};

/// Moves bytes from the network onto disk.
///
/// The catalog only talks to this trait, so tests can serve archives from
/// memory while production shells out to helper tools.
#[async_trait]
pub trait Fetcher: Send + Sync {
	/// Returns the body at `url`.
	async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

	/// Saves the body at `url` into `dest`.
	async fn download(&self, url: &str, dest: &Path) -> Result<()>;

	/// Unpacks the zip `archive` into `into`, overwriting existing files.
	async fn extract(&self, archive: &Path, into: &Path) -> Result<()>;
}

/// Fetcher backed by the `curl` and `unzip` executables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessFetcher;

impl ProcessFetcher {
	async fn run(program: &str, args: &[&OsStr]) -> Result<Vec<u8>> {
		let command = std::iter::once(program.to_string())
			.chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
			.collect::<Vec<_>>()
			.join(" ");
		tracing::debug!(%command, "running helper");

		let output = Command::new(program)
			.args(args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.output()
			.await
			.map_err(|error| CatalogError::Spawn {
				command: command.clone(),
				error,
			})?;

		if !output.status.success() {
			return Err(CatalogError::Process {
				command,
				code: output.status.code(),
				stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
			});
		}
		Ok(output.stdout)
	}
}

#[async_trait]
impl Fetcher for ProcessFetcher {
	async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
		Self::run("curl", &[OsStr::new("-sSfL"), OsStr::new(url)]).await
	}

	async fn download(&self, url: &str, dest: &Path) -> Result<()> {
		Self::run("curl", &[OsStr::new("-sSfL"), OsStr::new(url), OsStr::new("-o"), dest.as_os_str()]).await?;
		Ok(())
	}

	async fn extract(&self, archive: &Path, into: &Path) -> Result<()> {
		Self::run("unzip", &[OsStr::new("-o"), archive.as_os_str(), OsStr::new("-d"), into.as_os_str()]).await?;
		Ok(())
	}
}
