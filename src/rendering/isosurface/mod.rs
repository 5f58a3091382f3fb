pub mod upload;

pub use upload::{
    spawn_surface_visual, upload_surface_mesh, write_surface_mesh, SurfaceVertexColors,
};
