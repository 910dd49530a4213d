pub mod u601_sheet_migration;
