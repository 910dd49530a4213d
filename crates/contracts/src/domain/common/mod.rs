//! Common types shared by all sheet-linked aggregates

pub mod aggregate_id;
pub mod entity_kind;
pub mod entity_metadata;
pub mod sheet_id;

// Re-exports
pub use aggregate_id::{AggregateId, RecordId};
pub use entity_kind::EntityKind;
pub use entity_metadata::EntityMetadata;
pub use sheet_id::SheetId;
