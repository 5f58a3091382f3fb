pub mod render_texture;

pub use render_texture::{setup_render_texture, TransmissionBuffer, BUFFER_LAYER};
