//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use vmctl_protocol::{AboutInfo, ManagedObjectRef, Request, ServiceContent};
use vmctl_runtime::{Error, Result, RoundTripper, TransportState};

/// Replies per method from queued outcomes and records every request.
#[derive(Default)]
pub(crate) struct FakeTransport {
	replies: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
	requests: Mutex<Vec<Request>>,
}

impl FakeTransport {
	pub(crate) fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub(crate) fn respond(&self, method: &str, outcome: Result<Value>) {
		self.replies.lock().entry(method.to_string()).or_default().push_back(outcome);
	}

	pub(crate) fn calls(&self) -> Vec<String> {
		self.requests.lock().iter().map(|r| r.method.clone()).collect()
	}

	pub(crate) fn last_params(&self, method: &str) -> Option<Value> {
		self.requests.lock().iter().rev().find(|r| r.method == method).map(|r| r.params.clone())
	}
}

#[async_trait]
impl RoundTripper for FakeTransport {
	async fn round_trip(&self, request: Request) -> Result<Value> {
		let method = request.method.clone();
		self.requests.lock().push(request);
		self.replies
			.lock()
			.get_mut(&method)
			.and_then(VecDeque::pop_front)
			.unwrap_or_else(|| Err(Error::InvalidResponse(format!("no scripted reply for {method}"))))
	}

	fn state(&self) -> TransportState {
		TransportState {
			url: "https://vc.example.com/sdk".into(),
			insecure: false,
			namespace: "urn:vim25".into(),
			version: "6.0".into(),
			cookie: None,
			tunneled: false,
		}
	}
}

pub(crate) fn service_content(api_version: &str) -> ServiceContent {
	ServiceContent {
		about: AboutInfo {
			name: "VMware vCenter Server".into(),
			api_type: "VirtualCenter".into(),
			api_version: api_version.into(),
			..Default::default()
		},
		root_folder: ManagedObjectRef::new("Folder", "group-d1"),
		session_manager: Some(ManagedObjectRef::new("SessionManager", "SessionManager")),
		search_index: None,
	}
}
