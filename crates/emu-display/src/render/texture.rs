use std::path::Path;

use super::ctx::RenderCtx;
use super::error::DrawableError;

/// Decoded image, always 4 channels (RGBA8), rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub const CHANNELS: u32 = 4;

    #[inline]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * Self::CHANNELS
    }
}

/// Reads and decodes an image file, normalized to RGBA8.
pub fn decode_rgba(path: &Path) -> Result<DecodedImage, DrawableError> {
    let load_err = |reason: String| DrawableError::ResourceLoad {
        path: path.to_path_buf(),
        reason,
    };

    let rgba = image::open(path)
        .map_err(|e| load_err(e.to_string()))?
        .to_rgba8();

    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(load_err(format!("image has zero size ({width}x{height})")));
    }

    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// A 2D texture plus the view bound on the texture unit.
pub(crate) struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    /// Uploads `image` as an sRGB RGBA8 texture.
    pub fn upload(
        ctx: &RenderCtx<'_>,
        label: &str,
        image: &DecodedImage,
    ) -> Result<Self, String> {
        let max = ctx.device.limits().max_texture_dimension_2d;
        if image.width > max || image.height > max {
            return Err(format!(
                "{}x{} exceeds the device limit of {max} pixels per side",
                image.width, image.height
            ));
        }

        Ok(Self::create(ctx, label, image))
    }

    /// 1x1 opaque black, bound when the drawable has no texture of its own.
    ///
    /// Sampling it yields (0, 0, 0, 1), what an empty texture unit returns.
    pub fn placeholder(ctx: &RenderCtx<'_>) -> Self {
        let image = DecodedImage {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0, 255],
        };
        // 1x1 is within every device's limits.
        Self::create(ctx, "emu-display placeholder texture", &image)
    }

    fn create(ctx: &RenderCtx<'_>, label: &str, image: &DecodedImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.bytes_per_row()),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Repeat wrapping, nearest-neighbor filtering.
pub(crate) fn create_sampler(ctx: &RenderCtx<'_>) -> wgpu::Sampler {
    ctx.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("emu-display texture sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("emu-display-{}-{name}", std::process::id()))
    }

    #[test]
    fn rgb_image_is_expanded_to_rgba() {
        let path = temp_path("rgb.png");
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let decoded = decode_rgba(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.pixels.len(), 3 * 2 * 4);
        assert_eq!(decoded.bytes_per_row(), 12);
        assert_eq!(&decoded.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_is_a_resource_load_error() {
        let path = temp_path("does-not-exist.png");
        match decode_rgba(&path) {
            Err(DrawableError::ResourceLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected resource load error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_bytes_are_a_resource_load_error() {
        let path = temp_path("garbage.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let result = decode_rgba(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(DrawableError::ResourceLoad { .. })));
    }
}
