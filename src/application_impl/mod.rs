mod auth_service_impl;
mod bearer;

pub use auth_service_impl::*;
pub use bearer::*;
