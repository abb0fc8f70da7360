pub mod tenant;

pub use tenant::{TenantHeader, TENANT_ID_HEADER};
