//! Molt Remote Layer
//!
//! Remote deletion client implementations of the `DeletionClient` and
//! `ClientFactory` traits from `molt-domain`.
//!
//! # Architecture
//!
//! Clients fold every API-level error into a `RemoteOutcome` through the
//! documented mapping in [`api`]. Only failing to establish the authenticated
//! session surfaces as an error (`RemoteError::ConnectionFailed`).
//!
//! # Clients
//!
//! - `MockDeletionClient`: Deterministic scripted outcomes for testing
//! - `HttpDeletionClient`: The remote HTTP API
//!
//! # Examples
//!
//! ```
//! use molt_domain::traits::DeletionClient;
//! use molt_domain::{PostId, RemoteOutcome};
//! use molt_remote::MockDeletionClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let client = MockDeletionClient::new(RemoteOutcome::Confirmed);
//!     assert_eq!(client.delete(PostId::new(1)).await, RemoteOutcome::Confirmed);
//! }
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod http;

use molt_domain::traits::{ClientFactory, DeletionClient};
use molt_domain::{PostId, RemoteOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use http::{HttpClientFactory, HttpDeletionClient, RemoteConfig};

/// Errors that can occur while establishing a remote session
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The authenticated session could not be established
    #[error("Could not connect to the remote API: {0}")]
    ConnectionFailed(String),
}

/// Mock deletion client for deterministic testing
///
/// Returns pre-configured outcomes without making any network calls.
///
/// # Examples
///
/// ```
/// use molt_domain::{PostId, RemoteOutcome};
/// use molt_remote::MockDeletionClient;
///
/// let mut client = MockDeletionClient::default();
/// client.set_outcome(PostId::new(7), RemoteOutcome::PermanentlyBlocked("suspended".into()));
/// assert_eq!(client.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockDeletionClient {
    default_outcome: RemoteOutcome,
    outcomes: Arc<Mutex<HashMap<PostId, RemoteOutcome>>>,
    calls: Arc<Mutex<Vec<PostId>>>,
}

impl MockDeletionClient {
    /// Create a mock that answers every delete with the same outcome
    pub fn new(default_outcome: RemoteOutcome) -> Self {
        Self {
            default_outcome,
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the outcome for a specific post
    pub fn set_outcome(&mut self, id: PostId, outcome: RemoteOutcome) {
        self.outcomes.lock().unwrap().insert(id, outcome);
    }

    /// Get the number of times delete was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Ids passed to delete, in call order
    pub fn calls(&self) -> Vec<PostId> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for MockDeletionClient {
    fn default() -> Self {
        Self::new(RemoteOutcome::Confirmed)
    }
}

impl DeletionClient for MockDeletionClient {
    async fn delete(&self, id: PostId) -> RemoteOutcome {
        self.calls.lock().unwrap().push(id);

        let outcomes = self.outcomes.lock().unwrap();
        outcomes
            .get(&id)
            .cloned()
            .unwrap_or_else(|| self.default_outcome.clone())
    }
}

/// Mock client factory that hands out a shared `MockDeletionClient`
///
/// Built with [`MockClientFactory::failing`] it refuses to connect, which
/// exercises the run-abort path.
#[derive(Debug, Clone)]
pub struct MockClientFactory {
    client: MockDeletionClient,
    failure: Option<String>,
    connects: Arc<Mutex<usize>>,
}

impl MockClientFactory {
    /// Factory that always connects to the given client
    pub fn new(client: MockDeletionClient) -> Self {
        Self {
            client,
            failure: None,
            connects: Arc::new(Mutex::new(0)),
        }
    }

    /// Factory whose connection attempts always fail
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            client: MockDeletionClient::default(),
            failure: Some(reason.into()),
            connects: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of connection attempts
    pub fn connect_count(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

impl ClientFactory for MockClientFactory {
    type Client = MockDeletionClient;
    type Error = RemoteError;

    async fn connect(&self) -> Result<Self::Client, Self::Error> {
        *self.connects.lock().unwrap() += 1;

        match &self.failure {
            Some(reason) => Err(RemoteError::ConnectionFailed(reason.clone())),
            None => Ok(self.client.clone()),
        }
    }
}
