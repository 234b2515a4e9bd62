use anyhow::{bail, Context, Result};
use std::{
	fs,
	path::{Path, PathBuf},
};
use tempfile::TempDir;

/// A private, per-invocation location for `docker build --iidfile`.
///
/// The file lives in a fresh temporary directory that is removed with the guard,
/// whichever way the build ends.
#[derive(Debug)]
pub struct IidFile {
	path: PathBuf,
	dir: TempDir,
}

impl IidFile {
	/// Create a new, unique image id location. Docker creates the file itself.
	///
	/// # Errors
	///
	/// Returns an error if the temporary directory cannot be created.
	pub fn new() -> Result<Self> {
		let dir = tempfile::Builder::new()
			.prefix("clbuild-")
			.tempdir()
			.context("Failed to create a temporary directory for the image id")?;

		Ok(Self {
			path: dir.path().join("image-id"),
			dir,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Read the image id docker wrote, consuming the guard.
	///
	/// # Errors
	///
	/// Returns an error if the file is missing, unreadable, or empty.
	pub fn into_image_id(self) -> Result<String> {
		let image_id = fs::read_to_string(&self.path)
			.with_context(|| format!("Failed to read the image id from {}", self.path.display()))?;

		let image_id = image_id.trim();
		if image_id.is_empty() {
			bail!("docker build did not report an image id");
		}

		Ok(image_id.to_string())
	}
}

impl Drop for IidFile {
	fn drop(&mut self) {
		tracing::debug!("Removing image id directory at {:?}", self.dir.path());
	}
}
