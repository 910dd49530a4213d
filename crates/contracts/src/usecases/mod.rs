pub mod common;
pub mod u601_sheet_migration;
