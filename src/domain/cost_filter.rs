use uuid::Uuid;

use crate::domain::period::CostWindow;

/// Validated input of a total cost query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostFilter {
    pub window: CostWindow,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}
