pub mod description;
pub mod setup;

pub use description::{EnvironmentNode, MetaballNode, PhysicsScene, SceneDescription, SceneNode};
pub use setup::ScenePlugin;
