//! Permission aggregation (wildcard-aware merge of grants)

pub mod aggregator;
pub mod service_permissions;

pub use aggregator::{aggregate, PermissionAggregator};
pub use service_permissions::ServicePermissions;
