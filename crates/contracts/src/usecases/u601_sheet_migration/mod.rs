pub mod request;
pub mod response;

pub use request::MigrationQuery;
pub use response::{
    ColumnInfo, ColumnsResult, CompareResult, Comparison, FailureResponse, FieldDifference,
    FullMigrationResult, ImportResult, MigrationResponse, RowError, RowSkip, SideCount,
    StatusResult, SyncResult, SyncStatus,
};
