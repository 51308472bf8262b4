pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod render_object;
pub mod texture;
pub mod vertex_pool;
