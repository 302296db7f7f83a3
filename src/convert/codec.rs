use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebpOptions {
    pub quality: u8,
    pub lossless: bool,
}

/// The external codec seam: decode `source` and return the WebP bytes.
/// Runs on the blocking pool; the caller owns writing the output.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, source: &Path, options: WebpOptions) -> anyhow::Result<Vec<u8>>;
}

/// libwebp via the `webp` crate; `image` handles PNG/JPEG decoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebpEncoder;

impl ImageEncoder for WebpEncoder {
    fn encode(&self, source: &Path, options: WebpOptions) -> anyhow::Result<Vec<u8>> {
        let decoded = image::open(source)?;
        // libwebp only takes 8-bit RGB/RGBA buffers
        let img = if decoded.color().has_alpha() {
            image::DynamicImage::ImageRgba8(decoded.to_rgba8())
        } else {
            image::DynamicImage::ImageRgb8(decoded.to_rgb8())
        };
        let encoder = webp::Encoder::from_image(&img).map_err(|e| anyhow::anyhow!("{e}"))?;
        let memory = encoder
            .encode_simple(options.lossless, f32::from(options.quality))
            .map_err(|e| anyhow::anyhow!("libwebp: {e:?}"))?;
        Ok(memory.to_vec())
    }
}
