/// Vertex attribute layout shared by the vertex buffer and the vertex stage.
///
/// Vertices are tightly packed `f32` records: a 3-float position at
/// location 0, optionally followed by a 2-float UV at location 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    use_texture: bool,
}

impl VertexLayout {
    pub const POSITION_LOCATION: u32 = 0;
    pub const UV_LOCATION: u32 = 1;

    pub const POSITION_COMPONENTS: usize = 3;
    pub const UV_COMPONENTS: usize = 2;

    const POSITION_ONLY: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![
        0 => Float32x3 // position
    ];

    const POSITION_UV: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    #[inline]
    pub const fn new(use_texture: bool) -> Self {
        Self { use_texture }
    }

    #[inline]
    pub const fn uses_texture(self) -> bool {
        self.use_texture
    }

    /// Number of `f32` values in one vertex record.
    #[inline]
    pub const fn floats_per_vertex(self) -> usize {
        if self.use_texture {
            Self::POSITION_COMPONENTS + Self::UV_COMPONENTS
        } else {
            Self::POSITION_COMPONENTS
        }
    }

    /// Byte size of one vertex record.
    #[inline]
    pub const fn stride(self) -> u64 {
        (self.floats_per_vertex() * std::mem::size_of::<f32>()) as u64
    }

    pub fn attributes(self) -> &'static [wgpu::VertexAttribute] {
        if self.use_texture {
            &Self::POSITION_UV
        } else {
            &Self::POSITION_ONLY
        }
    }

    pub fn attribute(self, location: u32) -> Option<&'static wgpu::VertexAttribute> {
        self.attributes()
            .iter()
            .find(|a| a.shader_location == location)
    }

    /// Float components the attribute at `location` delivers, if present.
    pub fn components(self, location: u32) -> Option<usize> {
        // Every attribute is Float32xN.
        self.attribute(location)
            .map(|a| (a.format.size() / std::mem::size_of::<f32>() as u64) as usize)
    }

    pub fn buffer_layout(self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: self.attributes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const F32: u64 = std::mem::size_of::<f32>() as u64;

    #[test]
    fn untextured_layout_is_position_only() {
        let l = VertexLayout::new(false);
        assert_eq!(l.stride(), 3 * F32);
        assert_eq!(l.attributes().len(), 1);

        let pos = l.attribute(VertexLayout::POSITION_LOCATION).unwrap();
        assert_eq!(pos.format, wgpu::VertexFormat::Float32x3);
        assert_eq!(pos.offset, 0);
        assert!(l.attribute(VertexLayout::UV_LOCATION).is_none());
    }

    #[test]
    fn texture_adds_one_uv_attribute_after_position() {
        let plain = VertexLayout::new(false);
        let tex = VertexLayout::new(true);

        assert_eq!(tex.stride(), 5 * F32);
        assert_eq!(tex.attributes().len(), plain.attributes().len() + 1);

        // Position attribute is unchanged.
        assert_eq!(
            tex.attribute(VertexLayout::POSITION_LOCATION),
            plain.attribute(VertexLayout::POSITION_LOCATION)
        );

        let uv = tex.attribute(VertexLayout::UV_LOCATION).unwrap();
        assert_eq!(uv.format, wgpu::VertexFormat::Float32x2);
        assert_eq!(uv.offset, 3 * F32);
    }

    #[test]
    fn components_follow_attribute_formats() {
        let tex = VertexLayout::new(true);
        assert_eq!(tex.components(VertexLayout::POSITION_LOCATION), Some(3));
        assert_eq!(tex.components(VertexLayout::UV_LOCATION), Some(2));
        assert_eq!(VertexLayout::new(false).components(VertexLayout::UV_LOCATION), None);
    }

    #[test]
    fn attributes_fit_inside_stride() {
        for l in [VertexLayout::new(false), VertexLayout::new(true)] {
            for a in l.attributes() {
                assert!(a.offset + a.format.size() <= l.stride());
            }
        }
    }

    #[test]
    fn buffer_layout_matches_stride() {
        let bl = VertexLayout::new(true).buffer_layout();
        assert_eq!(bl.array_stride, 20);
        assert_eq!(bl.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(bl.attributes.len(), 2);
    }
}
