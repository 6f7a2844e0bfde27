//! GPU rendering subsystem.
//!
//! A [`Drawable`] owns one shape's GPU resources: render pipeline (linked
//! vertex + fragment stage), vertex and index buffers, and a texture bound on
//! group 0 ("texture unit 0").
//!
//! Convention:
//! - vertex positions are clip-space `[-1, 1]`, +Y up
//! - UVs put image row 0 at v = 0
//! - binding state lives in a render pass and never outlives it

mod ctx;
mod drawable;
mod error;
mod layout;
pub mod shader;
mod texture;

pub use ctx::RenderCtx;
pub use drawable::Drawable;
pub use error::{DrawableError, ShaderStage};
pub use layout::VertexLayout;
pub use texture::{decode_rgba, DecodedImage};
