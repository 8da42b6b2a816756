use std::borrow::Cow;

use anyhow::{Context, Result};

use crate::device::InitError;
use crate::grid::{GridUniform, QuadVertex};

/// Built-in cell shader.
pub const CELL_SHADER: ShaderProgram = ShaderProgram {
    label: "cellgrid cell shader",
    source: include_str!("shaders/cell.wgsl"),
    vertex_entry: "vs_main",
    fragment_entry: "fs_main",
    vertex_format: QuadVertex::FORMAT,
    uniform_size: GridUniform::SIZE,
};

/// WGSL source plus the interface the pipeline expects from it.
#[derive(Debug, Copy, Clone)]
pub struct ShaderProgram {
    pub label: &'static str,
    pub source: &'static str,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    /// Format of the vertex input at `@location(0)`.
    pub vertex_format: wgpu::VertexFormat,
    /// Byte size of the uniform at `@group(0) @binding(0)`.
    pub uniform_size: u64,
}

impl ShaderProgram {
    /// Parses and validates the source, then checks its reflected interface:
    /// both entry points, the location-0 vertex input and the group-0/binding-0
    /// uniform size.
    pub fn validate(&self) -> Result<()> {
        self.parse()
            .and_then(|module| self.check_interface(&module))
            .with_context(|| format!("shader `{}` does not match the grid pipeline", self.label))
            .context(InitError::ResourceCreation)
    }

    /// Creates the shader module after validating the interface.
    pub fn create_module(&self, device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
        self.validate()?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(self.source)),
        }))
    }

    fn parse(&self) -> Result<naga::Module> {
        let module = naga::front::wgsl::parse_str(self.source)
            .map_err(|e| anyhow::anyhow!(e.emit_to_string(self.source)))
            .context("WGSL parse failed")?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .map_err(|e| anyhow::anyhow!(e.emit_to_string(self.source)))
        .context("WGSL validation failed")?;

        Ok(module)
    }

    fn check_interface(&self, module: &naga::Module) -> Result<()> {
        let vertex = entry_point(module, naga::ShaderStage::Vertex, self.vertex_entry)
            .with_context(|| format!("missing vertex entry point `{}`", self.vertex_entry))?;
        entry_point(module, naga::ShaderStage::Fragment, self.fragment_entry)
            .with_context(|| format!("missing fragment entry point `{}`", self.fragment_entry))?;

        let input = vertex_input(module, vertex, 0)
            .context("vertex entry point has no input at @location(0)")?;
        let format = vertex_format(input)
            .with_context(|| format!("unsupported vertex input type {input:?}"))?;
        anyhow::ensure!(
            format == self.vertex_format,
            "vertex input is {format:?}, buffer layout is {:?}",
            self.vertex_format
        );

        let size = uniform_size(module, 0, 0)?
            .context("missing uniform at @group(0) @binding(0)")?;
        anyhow::ensure!(
            size == self.uniform_size,
            "uniform at @group(0) @binding(0) is {size} bytes, buffer is {} bytes",
            self.uniform_size
        );

        Ok(())
    }
}

fn entry_point<'m>(
    module: &'m naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Option<&'m naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
}

/// Type bound to `@location(location)`, either as a direct argument or a struct member.
fn vertex_input<'m>(
    module: &'m naga::Module,
    entry: &naga::EntryPoint,
    location: u32,
) -> Option<&'m naga::TypeInner> {
    let at_location = |binding: &Option<naga::Binding>| {
        matches!(binding, Some(naga::Binding::Location { location: l, .. }) if *l == location)
    };

    entry.function.arguments.iter().find_map(|arg| {
        if at_location(&arg.binding) {
            return Some(&module.types[arg.ty].inner);
        }
        match &module.types[arg.ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .find(|m| at_location(&m.binding))
                .map(|m| &module.types[m.ty].inner),
            _ => None,
        }
    })
}

fn vertex_format(ty: &naga::TypeInner) -> Option<wgpu::VertexFormat> {
    use naga::VectorSize as V;
    use wgpu::VertexFormat as F;

    match *ty {
        naga::TypeInner::Scalar(naga::Scalar::F32) => Some(F::Float32),
        naga::TypeInner::Vector { size, scalar: naga::Scalar::F32 } => Some(match size {
            V::Bi => F::Float32x2,
            V::Tri => F::Float32x3,
            V::Quad => F::Float32x4,
        }),
        _ => None,
    }
}

/// Reflected byte size of the uniform bound at `(group, binding)`, if any.
fn uniform_size(module: &naga::Module, group: u32, binding: u32) -> Result<Option<u64>> {
    let wanted = naga::ResourceBinding { group, binding };
    let Some((_, var)) = module.global_variables.iter().find(|(_, var)| {
        var.space == naga::AddressSpace::Uniform && var.binding.as_ref() == Some(&wanted)
    }) else {
        return Ok(None);
    };

    let mut layouter = naga::proc::Layouter::default();
    layouter
        .update(module.to_ctx())
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to compute uniform layout")?;

    Ok(Some(layouter[var.ty].size as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(source: &'static str) -> ShaderProgram {
        ShaderProgram { source, ..CELL_SHADER }
    }

    fn reason(p: ShaderProgram) -> String {
        let err = p.validate().unwrap_err();
        assert_eq!(InitError::classify(&err), Some(InitError::ResourceCreation));
        format!("{err:#}")
    }

    // ── built-in shader ───────────────────────────────────────────────────

    #[test]
    fn builtin_shader_matches_contract() {
        CELL_SHADER.validate().unwrap();
    }

    #[test]
    fn builtin_shader_reflects_grid_uniform() {
        let module = CELL_SHADER.parse().unwrap();
        assert_eq!(uniform_size(&module, 0, 0).unwrap(), Some(GridUniform::SIZE));
        assert_eq!(uniform_size(&module, 0, 1).unwrap(), None);
    }

    #[test]
    fn builtin_vertex_input_matches_quad_layout() {
        let module = CELL_SHADER.parse().unwrap();
        let vs = entry_point(&module, naga::ShaderStage::Vertex, "vs_main").unwrap();
        let input = vertex_input(&module, vs, 0).unwrap();
        assert_eq!(vertex_format(input), Some(wgpu::VertexFormat::Float32x2));
        assert_eq!(QuadVertex::layout().attributes[0].format, wgpu::VertexFormat::Float32x2);
    }

    // ── accepted ──────────────────────────────────────────────────────────

    #[test]
    fn attribute_order_does_not_matter() {
        let p = program(
            "@binding(0) @group(0) var<uniform> grid: vec2<f32>;\n\
             @vertex fn vs_main(@location(0) pos: vec2f) -> @builtin(position) vec4f {\n\
                 return vec4f(pos * grid, 0.0, 1.0);\n\
             }\n\
             @fragment fn fs_main() -> @location(0) vec4f { return vec4f(grid, 0.0, 1.0); }",
        );
        p.validate().unwrap();
    }

    // ── rejected ──────────────────────────────────────────────────────────

    #[test]
    fn missing_vertex_entry_is_rejected() {
        let p = ShaderProgram { vertex_entry: "vertexMain", ..CELL_SHADER };
        assert!(reason(p).contains("vertexMain"));
    }

    #[test]
    fn missing_fragment_entry_is_rejected() {
        let p = ShaderProgram { fragment_entry: "fragmentMain", ..CELL_SHADER };
        assert!(reason(p).contains("fragmentMain"));
    }

    #[test]
    fn entry_inside_block_comment_does_not_count() {
        let p = program(
            "@group(0) @binding(0) var<uniform> grid: vec2f;\n\
             /* @vertex fn vs_main( */\n\
             @fragment fn fs_main() -> @location(0) vec4f { return vec4f(grid, 0.0, 1.0); }",
        );
        assert!(reason(p).contains("vs_main"));
    }

    #[test]
    fn malformed_source_is_rejected() {
        let p = program("@vertex fn vs_main( { this is not wgsl }}}");
        assert!(reason(p).contains("parse failed"));
    }

    #[test]
    fn type_errors_are_rejected() {
        let p = program(
            "@group(0) @binding(0) var<uniform> grid: vec2f;\n\
             @vertex fn vs_main(@location(0) pos: vec2f) -> @builtin(position) vec4f {\n\
                 return pos;\n\
             }\n\
             @fragment fn fs_main() -> @location(0) vec4f { return vec4f(grid, 0.0, 1.0); }",
        );
        assert!(reason(p).contains("WGSL"));
    }

    #[test]
    fn missing_binding_is_rejected() {
        let p = program(
            "@vertex fn vs_main(@location(0) pos: vec2f) -> @builtin(position) vec4f {\n\
                 return vec4f(pos, 0.0, 1.0);\n\
             }\n\
             @fragment fn fs_main() -> @location(0) vec4f { return vec4f(1.0); }",
        );
        assert!(reason(p).contains("@binding(0)"));
    }

    #[test]
    fn uniform_size_mismatch_is_rejected() {
        let p = program(
            "@group(0) @binding(0) var<uniform> grid: vec4f;\n\
             @vertex fn vs_main(@location(0) pos: vec2f) -> @builtin(position) vec4f {\n\
                 return vec4f(pos, 0.0, 1.0) * grid;\n\
             }\n\
             @fragment fn fs_main() -> @location(0) vec4f { return grid; }",
        );
        assert!(reason(p).contains("16 bytes"));
    }

    #[test]
    fn vertex_input_mismatch_is_rejected() {
        let p = program(
            "@group(0) @binding(0) var<uniform> grid: vec2f;\n\
             @vertex fn vs_main(@location(0) pos: vec3f) -> @builtin(position) vec4f {\n\
                 return vec4f(pos.xy * grid, pos.z, 1.0);\n\
             }\n\
             @fragment fn fs_main() -> @location(0) vec4f { return vec4f(1.0); }",
        );
        assert!(reason(p).contains("Float32x3"));
    }
}
