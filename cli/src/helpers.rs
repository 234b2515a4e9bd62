use std::{
	fmt::Display,
	future::Future,
	time::{Duration, Instant},
};

/// Print a progress line on stdout.
pub fn step(message: impl Display) {
	println!("==> {message}");
}

pub async fn with_timing<T>(fut: impl Future<Output = T>) -> (T, Duration) {
	let start = Instant::now();
	let result = fut.await;

	(result, start.elapsed())
}
