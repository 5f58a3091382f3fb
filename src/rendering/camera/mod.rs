pub mod camera;

pub use camera::{camera_projection, setup_camera, MainCamera};
