//! Shader stage compilation and program linking.
//!
//! Stages are WGSL. Each stage is parsed and validated on its own first
//! (the "compile" step), then the pair is checked against the vertex layout,
//! the color target and the fixed bind group layout (the "link" step). This
//! catches the common mismatches with a readable message before any GPU
//! object exists; pipeline creation still runs inside a validation error
//! scope for whatever remains.

use naga::{
    AddressSpace, Binding, ImageClass, ImageDimension, Interpolation, Module, Sampling,
    ScalarKind, Type, TypeInner,
};

use super::error::{DrawableError, ShaderStage};
use super::layout::VertexLayout;

/// Entry point the vertex stage must export.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Entry point the fragment stage must export.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Name of the sampled texture on texture unit 0.
pub const TEXTURE_UNIFORM: &str = "texture1";

/// Bind group holding the texture unit.
pub const TEXTURE_GROUP: u32 = 0;
pub const TEXTURE_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;

/// Position-only pass-through vertex stage.
pub const DEFAULT_VERTEX_SHADER: &str = include_str!("shaders/position.vert.wgsl");

/// Solid white fragment stage.
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("shaders/white.frag.wgsl");

/// Vertex stage forwarding UVs from location 1.
pub const TEXTURED_VERTEX_SHADER: &str = include_str!("shaders/textured.vert.wgsl");

/// Fragment stage sampling `texture1`.
pub const TEXTURED_FRAGMENT_SHADER: &str = include_str!("shaders/textured.frag.wgsl");

/// A stage that parsed and validated.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    module: Module,
}

impl CompiledStage {
    pub fn module(&self) -> &Module {
        &self.module
    }
}

/// What the linked program needs from the pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProgramInterface {
    /// Some stage declares the texture unit (`texture1` or binding 0).
    pub samples_texture: bool,
}

/// Parses and validates one stage.
///
/// On failure the error carries the stage and the rendered diagnostic.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledStage, DrawableError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| {
        DrawableError::ShaderCompile {
            stage,
            log: e.emit_to_string(source),
        }
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| DrawableError::ShaderCompile {
            stage,
            log: e.emit_to_string(source),
        })?;

    Ok(CompiledStage { stage, module })
}

/// One `@location` value at a stage boundary.
#[derive(Debug, Clone, PartialEq)]
struct Varying {
    location: u32,
    ty: TypeInner,
    interpolation: Option<Interpolation>,
    sampling: Option<Sampling>,
}

/// Checks that `vertex` and `fragment` form a program for `layout` that can
/// write to a `target` color attachment.
pub fn link(
    vertex: &CompiledStage,
    fragment: &CompiledStage,
    layout: VertexLayout,
    target: wgpu::TextureFormat,
) -> Result<ProgramInterface, DrawableError> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(DrawableError::link(format!(
            "expected vertex + fragment stages, got {} + {}",
            vertex.stage, fragment.stage
        )));
    }

    let vs = find_entry(&vertex.module, naga::ShaderStage::Vertex, VERTEX_ENTRY)?;
    let fs = find_entry(&fragment.module, naga::ShaderStage::Fragment, FRAGMENT_ENTRY)?;

    // Vertex inputs must be fed by the buffer layout.
    for input in inputs(&vertex.module, vs) {
        let location = input.location;
        let Some(provided) = layout.components(location) else {
            return Err(DrawableError::link(format!(
                "{VERTEX_ENTRY} reads @location({location}), which the vertex layout does not provide \
                 (texture coordinates are only present when the drawable uses a texture)"
            )));
        };
        match float_width(&input.ty) {
            // A vec4 read of a shorter attribute is filled with (0, 0, 0, 1).
            Some(width) if width == provided || width == 4 => {}
            Some(width) => {
                return Err(DrawableError::link(format!(
                    "{VERTEX_ENTRY} reads @location({location}) as {width} float(s), \
                     but the vertex layout provides {provided}"
                )));
            }
            None => {
                return Err(DrawableError::link(format!(
                    "{VERTEX_ENTRY} @location({location}) must be a float scalar or vector"
                )));
            }
        }
    }

    // Inter-stage variables: every fragment input must be written with the
    // same type, interpolation and sampling.
    let produced = outputs(&vertex.module, vs);
    for input in inputs(&fragment.module, fs) {
        let location = input.location;
        let Some(out) = produced.iter().find(|v| v.location == location) else {
            return Err(DrawableError::link(format!(
                "{FRAGMENT_ENTRY} reads @location({location}), which {VERTEX_ENTRY} does not write"
            )));
        };
        if out.ty != input.ty {
            return Err(DrawableError::link(format!(
                "@location({location}) type differs between {VERTEX_ENTRY} and {FRAGMENT_ENTRY}"
            )));
        }
        if out.interpolation != input.interpolation || out.sampling != input.sampling {
            return Err(DrawableError::link(format!(
                "@location({location}) interpolation differs: {VERTEX_ENTRY} writes {:?}/{:?}, \
                 {FRAGMENT_ENTRY} reads {:?}/{:?}",
                out.interpolation, out.sampling, input.interpolation, input.sampling
            )));
        }
    }

    let needed = u32::from(target.components());
    let color_out = outputs(&fragment.module, fs)
        .into_iter()
        .find(|v| v.location == 0);
    match color_out.as_ref().map(|v| float_width(&v.ty)) {
        Some(Some(width)) if width as u32 >= needed => {}
        Some(Some(width)) => {
            return Err(DrawableError::link(format!(
                "{FRAGMENT_ENTRY} writes {width} component(s) to @location(0), \
                 but the {target:?} target needs {needed}"
            )));
        }
        Some(None) => {
            return Err(DrawableError::link(format!(
                "{FRAGMENT_ENTRY} @location(0) must be a float color"
            )));
        }
        None => {
            return Err(DrawableError::link(format!(
                "{FRAGMENT_ENTRY} does not write a color to @location(0)"
            )));
        }
    }

    let mut samples_texture = false;
    for stage in [vertex, fragment] {
        samples_texture |= check_resources(stage)?;
    }

    Ok(ProgramInterface { samples_texture })
}

fn find_entry<'m>(
    module: &'m Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Result<&'m naga::Function, DrawableError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
        .map(|ep| &ep.function)
        .ok_or_else(|| DrawableError::link(format!("no {stage:?} entry point named `{name}`")))
}

/// `@location` inputs of an entry point, including those inside struct arguments.
fn inputs(module: &Module, function: &naga::Function) -> Vec<Varying> {
    let mut out = Vec::new();
    for arg in &function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

/// `@location` outputs of an entry point.
fn outputs(module: &Module, function: &naga::Function) -> Vec<Varying> {
    let mut out = Vec::new();
    if let Some(result) = &function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn collect_locations(
    module: &Module,
    ty: naga::Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => out.push(Varying {
            location: *location,
            ty: inner.clone(),
            interpolation: *interpolation,
            sampling: *sampling,
        }),
        Some(_) => {}
        None => {
            if let TypeInner::Struct { members, .. } = inner {
                for m in members {
                    collect_locations(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Component count of a float scalar or vector.
fn float_width(inner: &TypeInner) -> Option<usize> {
    match inner {
        TypeInner::Scalar(s) if s.kind == ScalarKind::Float => Some(1),
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float => {
            Some(*size as usize)
        }
        _ => None,
    }
}

/// Rejects resource bindings the fixed bind group layout cannot satisfy.
///
/// Returns whether the stage declares the texture unit.
fn check_resources(stage: &CompiledStage) -> Result<bool, DrawableError> {
    let module = &stage.module;
    let mut declares_texture = false;

    for (_, var) in module.global_variables.iter() {
        let name = var.name.as_deref().unwrap_or("<unnamed>");

        if name == TEXTURE_UNIFORM {
            let at_unit_zero = var
                .binding
                .as_ref()
                .is_some_and(|b| b.group == TEXTURE_GROUP && b.binding == TEXTURE_BINDING);
            if !at_unit_zero {
                return Err(DrawableError::link(format!(
                    "`{TEXTURE_UNIFORM}` in the {} stage must be declared at \
                     @group({TEXTURE_GROUP}) @binding({TEXTURE_BINDING})",
                    stage.stage
                )));
            }
        }

        let Some(rb) = var.binding.as_ref() else {
            continue;
        };

        let inner = &module.types[var.ty].inner;
        let ok = rb.group == TEXTURE_GROUP
            && match rb.binding {
                TEXTURE_BINDING => matches!(
                    inner,
                    TypeInner::Image {
                        dim: ImageDimension::D2,
                        arrayed: false,
                        class: ImageClass::Sampled {
                            kind: ScalarKind::Float,
                            multi: false,
                        },
                    }
                ),
                SAMPLER_BINDING => matches!(inner, TypeInner::Sampler { comparison: false }),
                _ => false,
            }
            && var.space == AddressSpace::Handle;

        if !ok {
            return Err(DrawableError::link(format!(
                "`{name}` in the {} stage is bound at @group({}) @binding({}); only a 2D float \
                 texture at binding {TEXTURE_BINDING} and a filtering sampler at binding \
                 {SAMPLER_BINDING} of group {TEXTURE_GROUP} are available",
                stage.stage, rb.group, rb.binding
            )));
        }

        declares_texture |= rb.binding == TEXTURE_BINDING;
    }

    Ok(declares_texture)
}
