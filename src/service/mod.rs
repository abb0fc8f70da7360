//! Services behind the HTTP handlers.

mod model;
mod tenant;
pub use model::{Model, ModelService};
pub use tenant::TenantService;
