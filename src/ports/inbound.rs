//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: console/CLI invokes application use cases.
#[async_trait::async_trait]
pub trait ConsolePort: Send + Sync {
    /// Run the interactive portal loop until the operator exits.
    async fn run(&self) -> Result<(), DomainError>;
}
