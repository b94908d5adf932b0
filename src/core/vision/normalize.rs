use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

/// Image payload ready for the vision provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub base64: String,
    pub mime: String,
    /// False when the input could not be decoded and is forwarded as-is.
    pub reencoded: bool,
}

impl NormalizedImage {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// Drop a `data:<mime>;base64,` prefix if present.
pub fn strip_data_uri(input: &str) -> &str {
    let trimmed = input.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(trimmed, |(_, payload)| payload),
        None => trimmed,
    }
}

/// Decode inline base64 (with or without data-URI prefix) and normalize.
/// Undecodable base64 is forwarded untouched.
pub fn normalize_inline(input: &str, max_dimension: u32, quality: u8) -> NormalizedImage {
    let payload = strip_data_uri(input);
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => normalize_bytes(&bytes, max_dimension, quality),
        Err(err) => {
            tracing::warn!(error = %err, "inline image is not valid base64; forwarding as-is");
            NormalizedImage {
                base64: compact,
                mime: "image/jpeg".into(),
                reencoded: false,
            }
        }
    }
}

/// Bound the longest edge to `max_dimension` and re-encode as baseline JPEG.
///
/// Deterministic for identical input. Anything the decoder rejects is
/// forwarded unmodified with a sniffed MIME type.
pub fn normalize_bytes(bytes: &[u8], max_dimension: u32, quality: u8) -> NormalizedImage {
    match reencode(bytes, max_dimension, quality) {
        Ok(jpeg) => NormalizedImage {
            base64: BASE64.encode(jpeg),
            mime: "image/jpeg".into(),
            reencoded: true,
        },
        Err(err) => {
            tracing::warn!(error = %err, "image normalization failed; forwarding original bytes");
            NormalizedImage {
                base64: BASE64.encode(bytes),
                mime: infer::get(bytes)
                    .map_or("image/jpeg", |kind| kind.mime_type())
                    .to_string(),
                reencoded: false,
            }
        }
    }
}

fn reencode(bytes: &[u8], max_dimension: u32, quality: u8) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;
    let bounded = if decoded.width().max(decoded.height()) > max_dimension {
        decoded.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        decoded
    };

    let flattened = flatten_onto_white(&bounded);
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder.encode_image(&DynamicImage::ImageRgb8(flattened))?;
    Ok(out)
}

/// JPEG has no alpha channel; composite transparent pixels onto white.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut flat = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |channel: u8| -> u8 {
            let mixed = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            u8::try_from(mixed).unwrap_or(u8::MAX)
        };
        flat.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    flat
}
