use async_trait::async_trait;
use crate::domain::{
    error::ImportError,
    models::{CreateOrderResponse, ImportOutcome, OrderPayload},
};

/// The external endpoint that creates one order per call.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, payload: &OrderPayload) -> Result<CreateOrderResponse, ImportError>;
}

/// Append-only log of finished import runs, most recent first.
#[async_trait]
pub trait ImportHistoryStore: Send + Sync {
    async fn append(&self, outcome: ImportOutcome) -> Result<(), ImportError>;

    async fn recent(&self, limit: usize) -> Result<Vec<ImportOutcome>, ImportError>;
}
