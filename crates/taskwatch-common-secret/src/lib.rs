// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret handling for taskwatch.
//!
//! [`Secret<T>`] holds credentials such as the SMTP password. Its Debug,
//! Display and Serialize output is always `[REDACTED]`, and the inner value is
//! zeroized when dropped. The value is only reachable through
//! [`Secret::expose`].
//!
//! ```
//! use taskwatch_common_secret::Secret;
//!
//! let password = Secret::new("hunter2".to_string());
//! assert_eq!(format!("{password}"), "[REDACTED]");
//! assert_eq!(password.expose(), "hunter2");
//! ```

pub mod env;

use std::fmt;
use zeroize::Zeroize;

pub use env::{load_secret_env, SecretEnvError};

/// Placeholder written wherever a secret would otherwise be printed.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never show up in logs or config dumps.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Borrow the secret value. Call sites doing this are the ones to review.
	pub fn expose(&self) -> &T {
		&self.inner
	}

	/// Clone the inner value out; the wrapper still zeroizes its own copy.
	pub fn into_inner(self) -> T
	where
		T: Clone,
	{
		self.inner.clone()
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_are_redacted() {
		let secret = Secret::new("smtp-password".to_string());
		assert_eq!(format!("{secret:?}"), "Secret(\"[REDACTED]\")");
		assert_eq!(format!("{secret}"), REDACTED);
	}

	#[test]
	fn option_secret_debug_is_redacted() {
		let secret = Some(Secret::new("smtp-password".to_string()));
		let debug = format!("{secret:?}");
		assert!(debug.contains(REDACTED));
		assert!(!debug.contains("smtp-password"));
	}

	#[test]
	fn expose_and_into_inner_return_value() {
		let secret = Secret::new("smtp-password".to_string());
		assert_eq!(secret.expose(), "smtp-password");
		assert_eq!(secret.clone().into_inner(), "smtp-password");
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serialize_is_redacted_and_deserialize_populates() {
		let secret = Secret::new("smtp-password".to_string());
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, "\"[REDACTED]\"");

		let parsed: SecretString = serde_json::from_str("\"from-file\"").unwrap();
		assert_eq!(parsed.expose(), "from-file");
	}

	proptest! {
		#[test]
		fn debug_never_contains_secret(inner in "[a-zA-Z0-9!@#$%^&*_+=;:,.?/-]{3,40}") {
			prop_assume!(!inner.contains("REDACTED"));
			prop_assume!(!inner.contains("Secret"));
			let secret = Secret::new(inner.clone());
			let debug = format!("{:?}", secret);
			prop_assert!(!debug.contains(&inner));
		}
	}
}
