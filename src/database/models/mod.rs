pub mod endpoint_access;
pub mod user;

pub use endpoint_access::RouteStat;
pub use user::User;
