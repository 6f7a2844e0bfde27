use std::fmt;
use std::path::PathBuf;

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Errors raised while loading a [`Drawable`](super::Drawable).
///
/// All of them abort the load; the Drawable stays unloaded and draws nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawableError {
    /// A stage failed to parse or validate. `log` is the compiler diagnostic.
    ShaderCompile { stage: ShaderStage, log: String },

    /// The two stages do not form a valid program for this vertex layout.
    ShaderLink { stages: [ShaderStage; 2], log: String },

    /// The texture file could not be read or decoded.
    ResourceLoad { path: PathBuf, reason: String },

    /// Vertex/index data is inconsistent with the layout.
    InvalidGeometry(String),

    /// `load` was called on a Drawable that already owns GPU resources.
    AlreadyLoaded,
}

impl DrawableError {
    pub(crate) fn link(log: impl Into<String>) -> Self {
        DrawableError::ShaderLink {
            stages: [ShaderStage::Vertex, ShaderStage::Fragment],
            log: log.into(),
        }
    }

    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        DrawableError::InvalidGeometry(msg.into())
    }
}

impl fmt::Display for DrawableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawableError::ShaderCompile { stage, log } => {
                write!(f, "{stage} shader failed to compile:\n{log}")
            }
            DrawableError::ShaderLink { stages, log } => {
                write!(f, "shader program ({} + {}) failed to link: {log}", stages[0], stages[1])
            }
            DrawableError::ResourceLoad { path, reason } => {
                write!(f, "failed to load texture '{}': {reason}", path.display())
            }
            DrawableError::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            DrawableError::AlreadyLoaded => f.write_str("drawable is already loaded"),
        }
    }
}

impl std::error::Error for DrawableError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_stage() {
        let e = DrawableError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "expected ';'".into(),
        };
        assert!(e.to_string().starts_with("fragment shader failed to compile"));
    }

    #[test]
    fn link_error_lists_both_stages() {
        let e = DrawableError::link("missing vs_main");
        assert_eq!(
            e.to_string(),
            "shader program (vertex + fragment) failed to link: missing vs_main"
        );
    }
}
