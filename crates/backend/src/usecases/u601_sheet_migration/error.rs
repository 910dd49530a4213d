use contracts::usecases::common::UseCaseError;
use thiserror::Error;

use crate::shared::sheets::SheetError;

/// Failures that stop a whole migration run. Row-level failures never
/// surface here; they are collected into `errorDetails`.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Cannot reach sheet '{sheet}': {source}")]
    SheetApi {
        sheet: String,
        #[source]
        source: SheetError,
    },

    #[error("Record store unavailable: {0}")]
    Store(#[source] anyhow::Error),

    #[error("{0}")]
    Setup(String),

    #[error("Migration not configured: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),
}

impl MigrationError {
    pub fn sheet(sheet: &str, source: SheetError) -> Self {
        MigrationError::SheetApi {
            sheet: sheet.to_string(),
            source,
        }
    }
}

impl From<MigrationError> for UseCaseError {
    fn from(err: MigrationError) -> Self {
        match &err {
            MigrationError::SheetApi { .. } | MigrationError::Setup(_) => {
                UseCaseError::setup(err.to_string())
            }
            MigrationError::Store(_) => UseCaseError::new("STORE_ERROR", err.to_string()),
            MigrationError::Config(_) => UseCaseError::new("CONFIG_ERROR", err.to_string()),
            MigrationError::NotFound(_) => UseCaseError::not_found(err.to_string()),
        }
    }
}
