pub mod repository;
pub mod service;
pub mod u601_sheet_migration;
