pub mod descriptor;
pub mod error;
pub mod executor;
pub mod outcome;
pub mod read_back;
pub mod record_store;
pub mod registry;
pub mod sea_orm_store;

#[cfg(test)]
mod tests;

pub use descriptor::{Correlation, ExistingRowPolicy, MigrationEntity};
pub use error::MigrationError;
pub use executor::MigrationExecutor;
pub use record_store::{RecordStore, StoreRecord};
pub use sea_orm_store::{SeaOrmStore, SheetLinkedEntity};
