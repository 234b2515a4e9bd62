use clbuild_core::{tag, BuildResult, DerivedTag};
use std::path::{Path, PathBuf};

use super::{iidfile::IidFile, Engine, Error};
use crate::{
	helpers::{step, with_timing},
	options::Options,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildFailure {
	#[error(transparent)]
	Engine(#[from] Error),

	#[error("{0:#}")]
	ImageId(anyhow::Error),

	#[error("Could not derive a tag: {0}")]
	Tag(#[from] tag::Error),
}

/// A successfully built (and tagged) image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
	/// The `name:tag` the image can be referred to by.
	pub image: String,
	pub result: BuildResult,
}

enum Destination<'a> {
	Tag(&'a str),
	IidFile(&'a Path),
}

pub struct Builder<'a, E> {
	engine: &'a E,
	context: PathBuf,
	buildkit: bool,
}

impl<'a, E: Engine> Builder<'a, E> {
	pub const fn new(engine: &'a E, context: PathBuf, buildkit: bool) -> Self {
		Self {
			engine,
			context,
			buildkit,
		}
	}

	/// Build the image described by `options`.
	///
	/// With an explicit tag the image is built straight into `name:tag`. Otherwise it is built
	/// untagged and then tagged `name:<impl>-<release>`, where the release is the pinned version
	/// or, failing that, whatever the installed implementation reports.
	///
	/// # Errors
	///
	/// Returns an error if the build, the version query, or the tagging fails. Nothing is tagged
	/// after a failure.
	pub async fn build(&self, options: &Options) -> Result<Outcome, BuildFailure> {
		match &options.tag {
			Some(tag) => self.build_tagged(options, tag).await,
			None => self.build_untagged(options).await,
		}
	}

	async fn build_tagged(&self, options: &Options, tag: &str) -> Result<Outcome, BuildFailure> {
		let image = format!("{}:{tag}", options.image_name);

		let args = self.build_args(options, &Destination::Tag(&image));
		let elapsed_seconds = self.run_build(&args, options.quiet).await?;

		Ok(Outcome {
			result: BuildResult {
				artifact_id: image.clone(),
				elapsed_seconds,
			},
			image,
		})
	}

	async fn build_untagged(&self, options: &Options) -> Result<Outcome, BuildFailure> {
		let iidfile = IidFile::new().map_err(BuildFailure::ImageId)?;

		let args = self.build_args(options, &Destination::IidFile(iidfile.path()));
		let elapsed_seconds = self.run_build(&args, options.quiet).await?;
		let image_id = iidfile.into_image_id().map_err(BuildFailure::ImageId)?;

		let implementation = &options.implementation;
		let release = match implementation.version() {
			Some(version) => version.to_string(),
			None => {
				step(format!("Asking {image_id} for the {} version", implementation.name()));
				self.engine.query_version(&image_id).await?
			},
		};

		let tag = DerivedTag::new(implementation.name(), &release)?;
		let image = format!("{}:{tag}", options.image_name);

		self.engine.tag(&image_id, &image).await?;
		step(format!("Tagged {image_id} as {image}"));

		Ok(Outcome {
			image,
			result: BuildResult {
				artifact_id: image_id,
				elapsed_seconds,
			},
		})
	}

	async fn run_build(&self, args: &[String], quiet: bool) -> Result<u64, BuildFailure> {
		let (result, elapsed) = with_timing(self.engine.build(args, quiet)).await;
		result?;

		step(format!("Build finished in {}s", elapsed.as_secs()));
		Ok(elapsed.as_secs())
	}

	/// Arguments for `docker build`. Caller-supplied arguments come after ours so they win,
	/// and the context directory stays last.
	fn build_args(&self, options: &Options, destination: &Destination<'_>) -> Vec<String> {
		let mut args = Vec::new();

		// The classic builder doesn't know about --progress.
		if self.buildkit && !options.quiet {
			args.push("--progress=plain".to_string());
		}

		if options.quiet {
			args.push("--quiet".to_string());
		}

		args.extend([
			"--build-arg".to_string(),
			format!("IMPL={}", options.implementation),
		]);

		match destination {
			Destination::Tag(image) => args.extend(["--tag".to_string(), (*image).to_string()]),
			Destination::IidFile(path) => {
				args.extend(["--iidfile".to_string(), path.display().to_string()]);
			},
		}

		args.extend(options.extra_args.iter().cloned());
		args.push(self.context.display().to_string());

		args
	}
}
