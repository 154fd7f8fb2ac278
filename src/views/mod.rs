pub mod workloads;
pub mod containers;
pub mod endpoints;
mod common;

pub use workloads::WorkloadsView;
pub use containers::ContainersView;
pub use endpoints::EndpointsView;
pub use common::*;
