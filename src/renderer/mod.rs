//! Rendering module
//!
//! - `shapes`: local-space mesh generation
//! - `scene`: backend-agnostic frame submission through `Canvas`
//! - `pipeline`: the wgpu implementation of `Canvas`

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{GpuRenderer, Mesh, ShaderStage, SurfaceAction};
pub use scene::{Canvas, MeshKind, model_matrix, projection, render_scene};
pub use vertex::Vertex;
