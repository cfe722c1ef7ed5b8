//! Five-stage import wizard: Upload → Map → Preview → Importing → Done.
//!
//! Holds all pipeline state for one upload and enforces the stage guards.
//! `start_import` takes `&mut self` for the whole run, so a second run cannot
//! begin while one is in flight.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use crate::application::{
    auto_mapper::auto_map,
    import_executor::{ExecutorOptions, ImportExecutor},
    row_validator::{invalid_count, valid_count, validate_rows},
};
use crate::domain::{
    catalog::FieldCatalog,
    error::ImportError,
    models::{ColumnMapping, ImportOutcome, ImportProgress, RawTable, ValidatedRow, WizardStage},
    ports::{ImportHistoryStore, OrderGateway},
};
use crate::infrastructure::parsers::csv_parser::parse_csv;

pub struct ImportWizard {
    catalog: FieldCatalog,
    history: Arc<dyn ImportHistoryStore>,
    executor: ImportExecutor,
    progress: watch::Sender<ImportProgress>,
    stage: WizardStage,
    file_name: Option<String>,
    table: Option<RawTable>,
    mapping: ColumnMapping,
    validated: Vec<ValidatedRow>,
    outcome: Option<ImportOutcome>,
}

impl ImportWizard {
    pub fn new(
        catalog: FieldCatalog,
        gateway: Arc<dyn OrderGateway>,
        history: Arc<dyn ImportHistoryStore>,
        options: ExecutorOptions,
    ) -> Self {
        let (progress, _) = watch::channel(ImportProgress::default());
        Self {
            executor: ImportExecutor::new(gateway, history.clone(), options),
            catalog,
            history,
            progress,
            stage: WizardStage::Upload,
            file_name: None,
            table: None,
            mapping: ColumnMapping::new(),
            validated: Vec::new(),
            outcome: None,
        }
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn table(&self) -> Option<&RawTable> {
        self.table.as_ref()
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn validated_rows(&self) -> &[ValidatedRow] {
        &self.validated
    }

    pub fn valid_count(&self) -> usize {
        valid_count(&self.validated)
    }

    pub fn invalid_count(&self) -> usize {
        invalid_count(&self.validated)
    }

    /// Every row that will be skipped, in file order.
    pub fn invalid_rows(&self) -> impl Iterator<Item = &ValidatedRow> {
        self.validated.iter().filter(|r| !r.valid)
    }

    /// The first `limit` validated rows, for display.
    pub fn preview(&self, limit: usize) -> &[ValidatedRow] {
        &self.validated[..self.validated.len().min(limit)]
    }

    /// Outcome of the run that brought the wizard to Done.
    pub fn outcome(&self) -> Option<&ImportOutcome> {
        self.outcome.as_ref()
    }

    pub async fn history(&self, limit: usize) -> Result<Vec<ImportOutcome>, ImportError> {
        self.history.recent(limit).await
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ImportProgress> {
        self.progress.subscribe()
    }

    /// Upload → Map. Parses the file and seeds the mapping with suggestions.
    /// On `ParseEmpty` the wizard stays on Upload.
    pub fn upload(&mut self, file_name: &str, text: &str) -> Result<(), ImportError> {
        self.expect_stage(WizardStage::Upload, "upload a file")?;

        let table = parse_csv(text)?;
        if table.is_empty() {
            return Err(ImportError::ParseEmpty);
        }

        let mapping = auto_map(&table.headers, &self.catalog);
        info!(
            "Loaded '{}': {} rows, {} columns, {} fields auto-mapped",
            file_name,
            table.rows.len(),
            table.headers.len(),
            mapping.len()
        );

        self.file_name = Some(file_name.to_string());
        self.table = Some(table);
        self.mapping = mapping;
        self.revalidate();
        self.transition(WizardStage::Map);
        Ok(())
    }

    /// Points a field at a column of the uploaded file, replacing any
    /// previous choice. The column may already be used by another field.
    pub fn set_mapping(&mut self, field_key: &str, header: &str) -> Result<(), ImportError> {
        self.expect_stage(WizardStage::Map, "change the column mapping")?;
        self.check_field(field_key)?;

        let known = self.table.as_ref().map_or(false, |t| t.has_header(header));
        if !known {
            return Err(ImportError::UnknownHeader(header.to_string()));
        }

        debug!("Mapping field '{}' to column '{}'", field_key, header);
        self.mapping.set(field_key, header);
        self.revalidate();
        Ok(())
    }

    pub fn clear_mapping(&mut self, field_key: &str) -> Result<(), ImportError> {
        self.expect_stage(WizardStage::Map, "change the column mapping")?;
        self.check_field(field_key)?;

        debug!("Clearing mapping for field '{}'", field_key);
        self.mapping.clear(field_key);
        self.revalidate();
        Ok(())
    }

    /// Required fields that have no column yet, in catalog order.
    pub fn missing_required(&self) -> Vec<String> {
        self.catalog
            .required()
            .filter(|f| !self.mapping.is_mapped(f.key))
            .map(|f| f.key.to_string())
            .collect()
    }

    pub fn can_continue(&self) -> bool {
        self.stage == WizardStage::Map && self.missing_required().is_empty()
    }

    /// Map → Preview, once every required field is mapped.
    pub fn continue_to_preview(&mut self) -> Result<(), ImportError> {
        self.expect_stage(WizardStage::Map, "continue to preview")?;

        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(ImportError::MappingIncomplete(missing));
        }

        self.transition(WizardStage::Preview);
        Ok(())
    }

    /// Map → Upload. Discards the uploaded table and its mapping.
    pub fn back_to_upload(&mut self) -> Result<(), ImportError> {
        self.expect_stage(WizardStage::Map, "go back to upload")?;
        self.clear_upload();
        self.transition(WizardStage::Upload);
        Ok(())
    }

    /// Preview → Map, keeping the table and mapping.
    pub fn back_to_mapping(&mut self) -> Result<(), ImportError> {
        self.expect_stage(WizardStage::Preview, "go back to mapping")?;
        self.transition(WizardStage::Map);
        Ok(())
    }

    /// Preview → Importing → Done. Submits every valid row and returns the
    /// outcome, which is also appended to the history.
    ///
    /// If the returned future is dropped before the run finishes, the wizard
    /// falls back to Preview. Rows already accepted by the gateway stay
    /// created and no outcome is recorded.
    pub async fn start_import(&mut self) -> Result<&ImportOutcome, ImportError> {
        self.expect_stage(WizardStage::Preview, "start an import")?;
        if self.valid_count() == 0 {
            return Err(ImportError::NoValidRows);
        }

        self.transition(WizardStage::Importing);
        let total = self.valid_count();
        self.progress.send_replace(ImportProgress::new(0, total));

        let file_name = self.file_name.clone().unwrap_or_default();
        let progress = &self.progress;
        let guard = ImportingGuard {
            stage: &mut self.stage,
            armed: true,
        };
        let outcome = self
            .executor
            .run(&self.validated, &self.mapping, &self.catalog, &file_name, |p| {
                progress.send_replace(p);
            })
            .await;
        guard.disarm();

        self.transition(WizardStage::Done);
        Ok(self.outcome.insert(outcome))
    }

    /// Done → Upload ("import more"). Clears the upload and the current
    /// outcome; history is kept.
    pub fn import_more(&mut self) -> Result<(), ImportError> {
        self.expect_stage(WizardStage::Done, "start another import")?;
        self.clear_upload();
        self.outcome = None;
        self.progress.send_replace(ImportProgress::default());
        self.transition(WizardStage::Upload);
        Ok(())
    }

    fn expect_stage(&self, expected: WizardStage, action: &'static str) -> Result<(), ImportError> {
        if self.stage == expected {
            return Ok(());
        }
        warn!("Refusing to {} during the {} stage", action, self.stage);
        Err(ImportError::InvalidTransition {
            stage: self.stage,
            action,
        })
    }

    fn check_field(&self, field_key: &str) -> Result<(), ImportError> {
        match self.catalog.get(field_key) {
            Some(_) => Ok(()),
            None => Err(ImportError::UnknownField(field_key.to_string())),
        }
    }

    fn revalidate(&mut self) {
        self.validated = match &self.table {
            Some(table) => validate_rows(table, &self.mapping, &self.catalog),
            None => Vec::new(),
        };
    }

    fn clear_upload(&mut self) {
        self.file_name = None;
        self.table = None;
        self.mapping = ColumnMapping::new();
        self.validated.clear();
    }

    fn transition(&mut self, next: WizardStage) {
        info!("Import wizard: {} -> {}", self.stage, next);
        self.stage = next;
    }
}

/// Puts the wizard back on Preview if an import future is dropped mid-run.
struct ImportingGuard<'a> {
    stage: &'a mut WizardStage,
    armed: bool,
}

impl ImportingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ImportingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Import abandoned before completion, returning to {}", WizardStage::Preview);
            *self.stage = WizardStage::Preview;
        }
    }
}
