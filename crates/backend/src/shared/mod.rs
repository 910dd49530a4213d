pub mod config;
pub mod data;
pub mod field_mapper;
pub mod format;
pub mod sheets;
