pub mod cubemap;
pub mod environment;

pub use cubemap::equirect_to_cubemap;
pub use environment::{bind_environment_when_loaded, request_environment, EnvironmentState};
