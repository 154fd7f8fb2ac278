pub mod client;
pub mod resources;

pub use client::FluxClient;
pub use resources::{
    format_created, ContainerDescription, FluxContainer, FluxImage, FluxWorkload, WorkloadId,
};
