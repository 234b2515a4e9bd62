mod builder;
mod iidfile;

use async_trait::async_trait;
use clbuild_core::Config;
use std::{future::Future, io, process::Stdio};
use tokio::{process::Command, signal};

pub use builder::{BuildFailure, Builder};

/// Asks Roswell inside the image which version of the implementation it installed.
pub const VERSION_QUERY: [&str; 4] = ["ros", "-e", "(princ (lisp-implementation-version))", "-q"];

/// Errors that can occur when interacting with the docker CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Could not find `{0}`. Is Docker installed and on your PATH?")]
	NotInstalled(String),

	#[error("Could not connect to Docker. Is the docker daemon running?")]
	NotRunning,

	#[error("Failed to {action} (exit status {})", describe_code(.code))]
	Failed { action: &'static str, code: Option<i32> },

	#[error("{0}")]
	Command(String),

	#[error("Interrupted")]
	Interrupted,

	#[error("Failed to run command: {0}")]
	Spawn(#[from] io::Error),

	#[error("Failed to parse output from command: {0}")]
	ToString(#[from] std::string::FromUtf8Error),
}

/// Squash captured stderr into a single line for an error message.
pub fn stderr_summary(stderr: &[u8]) -> String {
	let stderr = String::from_utf8_lossy(stderr);
	tracing::debug!("Command stderr:\n{stderr}");

	stderr
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.collect::<Vec<_>>()
		.join("; ")
}

#[allow(clippy::ref_option)]
fn describe_code(code: &Option<i32>) -> String {
	code.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

/// The operations a build needs from the container engine.
#[async_trait]
pub trait Engine: Send + Sync {
	/// Run `build` with the given arguments, streaming progress unless `quiet`.
	async fn build(&self, args: &[String], quiet: bool) -> Result<(), Error>;

	/// Give an existing image an additional `name:tag`.
	async fn tag(&self, image_id: &str, target: &str) -> Result<(), Error>;

	/// Ask the runtime inside the image for its version, returning raw stdout.
	async fn query_version(&self, image_id: &str) -> Result<String, Error>;
}

/// A wrapper around the docker CLI.
#[derive(Debug, Clone)]
pub struct Docker {
	program: String,
	buildkit: bool,
}

impl Docker {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self {
			program: config.engine.clone(),
			buildkit: config.buildkit,
		}
	}

	/// Check that docker is installed and that the daemon is running.
	///
	/// # Errors
	///
	/// Returns an error if the executable cannot be found or the daemon is not reachable.
	pub async fn check_connection(&self) -> Result<(), Error> {
		let mut cmd = self.command();
		cmd.arg("info").stdout(Stdio::null()).stderr(Stdio::null());

		tracing::debug!("Running {:?}", cmd.as_std());
		let status = self.interruptible(cmd.status()).await?;

		if !status.success() {
			return Err(Error::NotRunning);
		}

		Ok(())
	}

	fn command(&self) -> Command {
		let mut cmd = Command::new(&self.program);
		cmd.stdin(Stdio::null()).kill_on_drop(true);

		cmd
	}

	fn spawn_error(&self, e: io::Error) -> Error {
		if e.kind() == io::ErrorKind::NotFound {
			Error::NotInstalled(self.program.clone())
		} else {
			Error::Spawn(e)
		}
	}

	/// Await a child process future, giving up if the user hits Ctrl-C.
	/// Commands are spawned with `kill_on_drop`, so abandoning the future kills the child.
	async fn interruptible<T>(&self, fut: impl Future<Output = io::Result<T>> + Send) -> Result<T, Error> {
		tokio::select! {
			result = fut => result.map_err(|e| self.spawn_error(e)),
			Ok(()) = signal::ctrl_c() => Err(Error::Interrupted),
		}
	}
}

#[async_trait]
impl Engine for Docker {
	async fn build(&self, args: &[String], quiet: bool) -> Result<(), Error> {
		let mut cmd = self.command();
		cmd.arg("build")
			.args(args)
			.env("DOCKER_BUILDKIT", if self.buildkit { "1" } else { "0" })
			.stdout(if quiet { Stdio::null() } else { Stdio::inherit() })
			.stderr(Stdio::inherit());

		tracing::debug!("Running {:?}", cmd.as_std());
		let status = self.interruptible(cmd.status()).await?;

		if !status.success() {
			return Err(Error::Failed {
				action: "build image",
				code: status.code(),
			});
		}

		Ok(())
	}

	async fn tag(&self, image_id: &str, target: &str) -> Result<(), Error> {
		let mut cmd = self.command();
		cmd.arg("tag").arg(image_id).arg(target);

		tracing::debug!("Running {:?}", cmd.as_std());
		let output = self.interruptible(cmd.output()).await?;

		if !output.status.success() {
			return Err(Error::Command(format!(
				"Failed to tag image as {target}: {}",
				stderr_summary(&output.stderr)
			)));
		}

		Ok(())
	}

	async fn query_version(&self, image_id: &str) -> Result<String, Error> {
		let mut cmd = self.command();
		cmd.arg("run").arg("--rm").arg(image_id).args(VERSION_QUERY);

		tracing::debug!("Running {:?}", cmd.as_std());
		let output = self.interruptible(cmd.output()).await?;

		if !output.status.success() {
			return Err(Error::Command(format!(
				"Failed to query the implementation version: {}",
				stderr_summary(&output.stderr)
			)));
		}

		Ok(String::from_utf8(output.stdout)?)
	}
}
