pub mod admin;
pub mod auth;
pub mod quota;
pub mod response;
pub mod stats;

pub use admin::require_admin;
pub use auth::{require_session, CurrentUser};
pub use quota::{track_api_calls, QuotaStanding};
pub use response::{ApiResponse, ApiResult};
pub use stats::track_route_stats;
