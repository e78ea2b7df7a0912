//! HTTP adapter module. Implements ApiGateway over reqwest.
//!
//! Provides the real backend client and a scripted mock for testing.

pub mod api_client;
pub mod mock_gateway;

pub use api_client::ApiClient;
pub use mock_gateway::MockGateway;
