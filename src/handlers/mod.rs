//! HTTP handlers for tenant administration and tenant-scoped models.

pub mod model;
pub mod tenant;
pub use model::*;
pub use tenant::*;
