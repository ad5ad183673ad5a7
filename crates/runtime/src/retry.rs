//! Bounded retry for temporary network errors.
//!
//! [`Retry`] wraps any [`RoundTripper`] and re-sends a request when the
//! inner transport fails with an error the policy classifies as transient.
//! There is no backoff: each attempt takes as long as the transport does.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use vmctl_protocol::Request;

use crate::error::{Error, Result};
use crate::transport::{RoundTripper, TransportState};

/// Total attempts per logical call: one initial try plus two retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Attempt budget and transient-error classifier.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
	/// Total attempts including the first; values below 1 act as 1.
	pub max_attempts: u32,
	/// Returns `true` for errors worth another attempt.
	pub is_retryable: fn(&Error) -> bool,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			is_retryable: Error::is_transient,
		}
	}
}

impl RetryPolicy {
	pub fn with_max_attempts(max_attempts: u32) -> Self {
		Self {
			max_attempts,
			..Default::default()
		}
	}
}

/// [`RoundTripper`] decorator applying a [`RetryPolicy`].
pub struct Retry {
	inner: Arc<dyn RoundTripper>,
	policy: RetryPolicy,
}

impl Retry {
	pub fn new(inner: Arc<dyn RoundTripper>, policy: RetryPolicy) -> Self {
		Self { inner, policy }
	}
}

#[async_trait]
impl RoundTripper for Retry {
	async fn round_trip(&self, request: Request) -> Result<Value> {
		let max_attempts = self.policy.max_attempts.max(1);
		let mut attempt = 0u32;

		loop {
			attempt += 1;

			match self.inner.round_trip(request.clone()).await {
				Ok(value) => return Ok(value),
				Err(err) if attempt < max_attempts && (self.policy.is_retryable)(&err) => {
					warn!(
						target = "vmctl.retry",
						method = %request.method,
						attempt,
						error = %err,
						"temporary network error, retrying"
					);
				}
				Err(err) => {
					debug!(target = "vmctl.retry", method = %request.method, attempt, error = %err, "giving up");
					return Err(err);
				}
			}
		}
	}

	fn state(&self) -> TransportState {
		self.inner.state()
	}
}

/// Retries twice when a temporary I/O error occurs, a maximum of 3 attempts.
pub fn attach_retries(inner: Arc<dyn RoundTripper>) -> Arc<dyn RoundTripper> {
	Arc::new(Retry::new(inner, RetryPolicy::default()))
}

#[cfg(test)]
mod tests {
	use std::collections::VecDeque;
	use std::io::ErrorKind;
	use std::sync::atomic::{AtomicU32, Ordering};

	use parking_lot::Mutex;
	use serde_json::json;
	use vmctl_protocol::{Fault, INVALID_LOGIN};

	use super::*;

	/// Plays back scripted outcomes, one per call.
	struct Scripted {
		outcomes: Mutex<VecDeque<Result<Value>>>,
		calls: AtomicU32,
	}

	impl Scripted {
		fn new(outcomes: Vec<Result<Value>>) -> Arc<Self> {
			Arc::new(Self {
				outcomes: Mutex::new(outcomes.into()),
				calls: AtomicU32::new(0),
			})
		}

		fn calls(&self) -> u32 {
			self.calls.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl RoundTripper for Scripted {
		async fn round_trip(&self, _request: Request) -> Result<Value> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.outcomes.lock().pop_front().unwrap_or_else(|| Err(Error::InvalidResponse("script exhausted".into())))
		}

		fn state(&self) -> TransportState {
			TransportState {
				url: "https://host/sdk".into(),
				insecure: false,
				namespace: "urn:vim25".into(),
				version: "6.0".into(),
				cookie: Some("session=1".into()),
				tunneled: false,
			}
		}
	}

	fn reset(msg: &str) -> Result<Value> {
		Err(Error::Io(std::io::Error::new(ErrorKind::ConnectionReset, msg.to_string())))
	}

	fn request() -> Request {
		Request::new("currentSession", Value::Null)
	}

	#[tokio::test]
	async fn succeeds_on_third_attempt_after_two_transient_failures() {
		let inner = Scripted::new(vec![reset("first"), reset("second"), Ok(json!({ "ok": true }))]);
		let retry = attach_retries(inner.clone());

		let value = retry.round_trip(request()).await.unwrap();
		assert_eq!(value, json!({ "ok": true }));
		assert_eq!(inner.calls(), 3);
	}

	#[tokio::test]
	async fn surfaces_third_error_and_stops() {
		let inner = Scripted::new(vec![reset("first"), reset("second"), reset("third"), Ok(Value::Null)]);
		let retry = attach_retries(inner.clone());

		let err = retry.round_trip(request()).await.unwrap_err();
		assert!(err.is_transient());
		assert!(err.to_string().contains("third"), "unexpected error: {err}");
		assert_eq!(inner.calls(), 3);
	}

	#[tokio::test]
	async fn remote_fault_is_not_retried() {
		let inner = Scripted::new(vec![Err(Error::Fault(Fault::new(INVALID_LOGIN, "bad password"))), Ok(Value::Null)]);
		let retry = attach_retries(inner.clone());

		let err = retry.round_trip(request()).await.unwrap_err();
		assert!(err.is_fault(INVALID_LOGIN));
		assert_eq!(inner.calls(), 1);
	}

	#[tokio::test]
	async fn zero_attempt_budget_still_tries_once() {
		let inner = Scripted::new(vec![reset("only")]);
		let retry = Retry::new(inner.clone(), RetryPolicy::with_max_attempts(0));

		assert!(retry.round_trip(request()).await.is_err());
		assert_eq!(inner.calls(), 1);
	}

	#[test]
	fn state_passes_through_to_inner_transport() {
		let inner = Scripted::new(Vec::new());
		let retry = attach_retries(inner);
		assert_eq!(retry.state().cookie.as_deref(), Some("session=1"));
	}
}
