pub mod camera;
pub mod renderer;

pub use camera::{look_at_rh, mat4_mul, perspective_rh_z0, view_proj};
pub use renderer::{LineBatch, MAP_ORIENTATION, PointBatch, RenderFrame, collect_render_frame};
