#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use clbuild_core::Config;
use std::ffi::OsString;
use tracing_subscriber::EnvFilter;

use crate::{
	context::Context,
	errors::Error,
	helpers::step,
	options::{Parsed, ValidationError},
};

mod context;
mod docker;
mod errors;
mod helpers;
mod options;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.without_time()
		.init();

	if let Err(e) = run(std::env::args_os().skip(1).collect()).await {
		eprintln!("ERROR: {e}");
		std::process::exit(e.exit_code());
	}
}

/// The warning to show when running somewhere verbose docker output is known to hang.
const fn terminal_note(config: &Config) -> Option<&'static str> {
	if config.inside_emacs {
		Some("Note: verbose docker output can hang inside Emacs; pass -q if it does")
	} else {
		None
	}
}

async fn run(args: Vec<OsString>) -> Result<(), Error> {
	let options = match options::parse(args) {
		Ok(Parsed::Build(options)) => options,
		Ok(Parsed::Help) => {
			print!("{}", options::usage());
			return Ok(());
		},
		Err(e @ ValidationError::MissingRequired(_)) => {
			eprint!("{}", options::usage());
			return Err(e.into());
		},
		Err(e) => return Err(e.into()),
	};

	let ctx = Context::new(Config::from_env()).await?;
	tracing::debug!("Resolved configuration: {:?}", ctx.config);

	if let Some(note) = terminal_note(&ctx.config) {
		step(note);
	}

	step(format!(
		"Building {} with IMPL={} from {}",
		options.image_name,
		options.implementation,
		ctx.cwd.display()
	));

	if !options.tag_explicit() {
		tracing::debug!("No tag given, deriving one from {}", options.implementation);
	}

	let outcome = ctx.builder().build(&options).await?;
	tracing::debug!("Build result: {:?}", outcome.result);

	step(format!("Image built as {}", outcome.image));

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args(args: &[&str]) -> Vec<OsString> {
		args.iter().map(OsString::from).collect()
	}

	#[test]
	fn emacs_marker_alone_triggers_the_note() {
		let inside_emacs = Config {
			inside_emacs: true,
			..Config::default()
		};

		assert!(terminal_note(&inside_emacs).is_some_and(|note| note.contains("Emacs")));
		assert_eq!(terminal_note(&Config::default()), None);
	}

	#[tokio::test]
	async fn missing_impl_fails_before_touching_docker() {
		let err = run(args(&["-n", "foo"]))
			.await
			.unwrap_err();

		assert!(matches!(
			err,
			Error::Validation(ValidationError::MissingRequired("--impl"))
		));
		assert_eq!(err.exit_code(), 2);
	}

	#[tokio::test]
	async fn help_succeeds_without_docker() {
		assert!(run(Vec::new()).await.is_ok());
		assert!(run(args(&["--help"])).await.is_ok());
	}

	#[tokio::test]
	async fn unknown_options_fail_validation() {
		let err = run(args(&["--impl", "ecl", "--frobnicate"]))
			.await
			.unwrap_err();

		assert_eq!(err.exit_code(), 2);
	}
}
