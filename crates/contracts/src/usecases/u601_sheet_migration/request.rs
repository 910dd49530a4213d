use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query string of the import / sync / full-migration endpoints.
///
/// Each entity reads its own correlation parameter (`creditApplicationId`,
/// `staffId`, `borrowerId`, `loanId`), everything else is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationQuery {
    #[serde(flatten)]
    pub params: HashMap<String, String>,
}

impl MigrationQuery {
    /// Non-blank value of the given parameter
    pub fn value(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
