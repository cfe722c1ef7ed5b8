//! Bulk CSV import of delivery orders.
//!
//! An uploaded CSV is parsed, its columns are mapped onto the order schema,
//! rows are checked for required values, and the valid ones are submitted to
//! the order API one at a time. A failed row never stops the run.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::import_executor::{ExecutorOptions, ImportExecutor};
pub use application::wizard::ImportWizard;
pub use domain::catalog::{FieldCatalog, FieldSpec};
pub use domain::error::ImportError;
pub use domain::models::{ColumnMapping, ImportOutcome, RawTable, RowError, ValidatedRow, WizardStage};
pub use domain::ports::{ImportHistoryStore, OrderGateway};
