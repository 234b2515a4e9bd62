#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod implementation;
pub mod tag;

pub use config::Config;
pub use implementation::ImplSpec;
pub use tag::{sanitize, DerivedTag};

/// Image name used when `--name` is not given.
pub const DEFAULT_IMAGE_NAME: &str = "cl-amazon-linux";

/// The outcome of a single `docker build` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
	/// The reference the build produced: the explicit `name:tag`, or the image id reported by the engine.
	pub artifact_id: String,
	pub elapsed_seconds: u64,
}
