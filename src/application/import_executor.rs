use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use crate::domain::{
    catalog::FieldCatalog,
    error::ImportError,
    models::{
        ColumnMapping, CreateOrderResponse, ImportOutcome, ImportProgress, OrderPayload,
        RowError, ValidatedRow,
    },
    ports::{ImportHistoryStore, OrderGateway},
};

pub const UNKNOWN_ERROR: &str = "unknown error";
pub const CANCELLED_MESSAGE: &str = "import cancelled";

enum RowResult {
    Accepted,
    Failed(String),
    Cancelled,
}

/// Knobs for a run. The defaults wait indefinitely and cannot be cancelled.
#[derive(Debug, Clone, Default)]
pub struct ExecutorOptions {
    /// Upper bound on a single create-order call.
    pub row_timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

/// Submits valid rows to the order gateway one at a time.
pub struct ImportExecutor {
    gateway: Arc<dyn OrderGateway>,
    history: Arc<dyn ImportHistoryStore>,
    options: ExecutorOptions,
}

impl ImportExecutor {
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        history: Arc<dyn ImportHistoryStore>,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            gateway,
            history,
            options,
        }
    }

    /// Runs one import over the rows that are currently valid and records the
    /// outcome in the history store.
    ///
    /// Rows are awaited strictly in order. A rejected or failed row is
    /// recorded and the run moves on; nothing short of cancellation stops it.
    pub async fn run<F>(
        &self,
        rows: &[ValidatedRow],
        mapping: &ColumnMapping,
        catalog: &FieldCatalog,
        file_name: &str,
        mut on_progress: F,
    ) -> ImportOutcome
    where
        F: FnMut(ImportProgress),
    {
        let started_at = Utc::now();
        let valid_rows: Vec<&ValidatedRow> = rows.iter().filter(|r| r.valid).collect();
        let total = valid_rows.len();
        info!("Starting import of {} rows from '{}'", total, file_name);

        let mut success_count = 0;
        let mut errors = Vec::new();
        let mut cancelled = false;

        for (position, row) in valid_rows.iter().enumerate() {
            let row_number = position + 1;
            let source_row = row.row.index + 1;

            let result = if cancelled || self.is_cancelled() {
                RowResult::Cancelled
            } else {
                let payload = build_order_payload(row, mapping, catalog);
                debug!("Submitting row {} of {} ({} fields)", row_number, total, payload.len());
                self.submit(&payload).await
            };

            let message = match result {
                RowResult::Accepted => {
                    success_count += 1;
                    None
                }
                RowResult::Failed(message) => {
                    warn!("Row {} (file row {}) failed: {}", row_number, source_row, message);
                    Some(message)
                }
                RowResult::Cancelled => {
                    cancelled = true;
                    Some(CANCELLED_MESSAGE.to_string())
                }
            };
            if let Some(message) = message {
                errors.push(RowError {
                    row_number,
                    source_row,
                    message,
                });
            }

            on_progress(ImportProgress::new(row_number, total));
        }

        let outcome = ImportOutcome {
            id: Uuid::new_v4(),
            total,
            success_count,
            failure_count: errors.len(),
            errors,
            file_name: file_name.to_string(),
            started_at,
            timestamp: Utc::now(),
            cancelled,
        };

        if cancelled {
            warn!("Import of '{}' was cancelled", file_name);
        }
        info!(
            "✅ Import of '{}' finished: {} of {} rows imported, {} failed",
            file_name, outcome.success_count, outcome.total, outcome.failure_count
        );

        if let Err(e) = self.history.append(outcome.clone()).await {
            error!("Failed to record import outcome {}: {}", outcome.id, e);
        }

        outcome
    }

    fn is_cancelled(&self) -> bool {
        self.options
            .cancellation
            .as_ref()
            .map_or(false, CancellationToken::is_cancelled)
    }

    /// One create-order call, reduced to what gets recorded for the row.
    async fn submit(&self, payload: &OrderPayload) -> RowResult {
        let call = self.call_with_timeout(payload);

        let response = match &self.options.cancellation {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return RowResult::Cancelled,
                response = call => response,
            },
            None => call.await,
        };

        match response {
            Ok(CreateOrderResponse { success: true, .. }) => RowResult::Accepted,
            Ok(CreateOrderResponse { message, .. }) => RowResult::Failed(non_blank(message)),
            Err(e) => {
                error!("Create-order call failed: {}", e);
                RowResult::Failed(non_blank(Some(e.to_string())))
            }
        }
    }

    async fn call_with_timeout(&self, payload: &OrderPayload) -> Result<CreateOrderResponse, ImportError> {
        match self.options.row_timeout {
            Some(limit) => tokio::time::timeout(limit, self.gateway.create_order(payload))
                .await
                .unwrap_or_else(|_| {
                    Err(ImportError::Transport(format!(
                        "request timed out after {} ms",
                        limit.as_millis()
                    )))
                }),
            None => self.gateway.create_order(payload).await,
        }
    }
}

fn non_blank(message: Option<String>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Builds the create-order body for one row. Unmapped fields and blank
/// values are left out rather than sent empty.
pub fn build_order_payload(row: &ValidatedRow, mapping: &ColumnMapping, catalog: &FieldCatalog) -> OrderPayload {
    let mut payload = OrderPayload::new();

    for field in catalog.fields() {
        let value = mapping
            .get(field.key)
            .and_then(|header| row.row.value(header))
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(value) = value {
            payload.insert(field.key.to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    payload
}
