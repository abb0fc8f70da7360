mod common;
mod model;
mod tenant;

pub use common::{common_routes, common_routes_with_ready};
pub use model::model_routes;
pub use tenant::tenant_routes;
