use clbuild_core::Config;
use std::{io, path::PathBuf};

use crate::{
	docker::{self, Builder, Docker},
	errors::Error,
};

#[derive(Debug, Clone)]
pub struct Context {
	pub config: Config,
	pub docker: Docker,
	pub cwd: PathBuf,
}

impl Context {
	/// Create a new context
	///
	/// # Errors
	///
	/// This function will return an error if docker is missing, the daemon is not running, or the build context cannot be determined.
	pub async fn new(config: Config) -> Result<Self, Error> {
		let docker = Docker::new(&config);
		docker.check_connection().await.map_err(|e| match e {
			docker::Error::Interrupted => Error::Interrupted,
			e => Error::Environment(e),
		})?;

		let cwd = match &config.context {
			Some(context) => context.clone(),
			None => std::env::current_dir().map_err(Error::Context)?,
		};

		if !cwd.is_dir() {
			return Err(Error::Context(io::Error::new(
				io::ErrorKind::NotFound,
				format!("{} is not a directory", cwd.display()),
			)));
		}

		Ok(Self {
			config,
			docker,
			cwd,
		})
	}

	#[must_use]
	pub fn builder(&self) -> Builder<'_, Docker> {
		Builder::new(&self.docker, self.cwd.clone(), self.config.buildkit)
	}
}
