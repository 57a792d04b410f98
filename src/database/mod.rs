pub mod manager;
pub mod models;
pub mod route_stats;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use route_stats::RouteStatsStore;
pub use users::UserStore;
