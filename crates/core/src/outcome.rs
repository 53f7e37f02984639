//! Structured command results for the presentation layer.

use serde::Serialize;

/// `{success, message}` record returned by every user-facing command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
	pub success: bool,
	pub message: String,
}

impl Outcome {
	pub fn ok() -> Self {
		Self::ok_with("Success")
	}

	pub fn ok_with(message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: message.into(),
		}
	}

	pub fn failed(message: impl Into<String>) -> Self {
		let message = message.into();
		tracing::warn!(%message, "command failed");
		Self { success: false, message }
	}
}

impl<E: std::fmt::Display> From<Result<(), E>> for Outcome {
	fn from(result: Result<(), E>) -> Self {
		match result {
			Ok(()) => Self::ok(),
			Err(e) => Self::failed(e.to_string()),
		}
	}
}
