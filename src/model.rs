//! The autoencoder inference boundary.
//!
//! The variational autoencoder that produced the catalog embeddings is
//! trained and hosted outside this crate. All the service needs from it is
//! decoding: latent embedding in, rendered glyph image out. That boundary
//! is the [`GlyphDecoder`] trait; interpolation itself is plain latent
//! arithmetic and lives here.

use crate::embedding::Embedding;
use crate::error::FontscapeResult;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Decodes latent embeddings into rendered glyph images.
///
/// Implementations wrap whatever actually runs the model: a sidecar
/// process, an ONNX runtime, a remote inference endpoint. The contract is
/// just bytes of an encoded PNG.
pub trait GlyphDecoder: Send + Sync {
    /// Render the glyph for a latent embedding as PNG bytes.
    fn decode(&self, embedding: &Embedding) -> FontscapeResult<Vec<u8>>;
}

/// The three images an interpolation request produces, base64-encoded for
/// direct use in `img` tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolatedGlyphs {
    /// Decoded glyph of the first font
    pub font_1_image: String,
    /// Decoded glyph at the interpolation point
    pub interpolated_image: String,
    /// Decoded glyph of the second font
    pub font_2_image: String,
}

/// Decode both endpoints and their interpolation at `fraction`.
///
/// `fraction` 0 is the first font, 1 the second; out-of-range values are
/// clamped by the lerp.
pub fn interpolate_glyphs(
    decoder: &dyn GlyphDecoder,
    font_1: &Embedding,
    font_2: &Embedding,
    fraction: f32,
) -> FontscapeResult<InterpolatedGlyphs> {
    let midpoint = font_1.lerp(font_2, fraction)?;

    Ok(InterpolatedGlyphs {
        font_1_image: BASE64.encode(decoder.decode(font_1)?),
        interpolated_image: BASE64.encode(decoder.decode(&midpoint)?),
        font_2_image: BASE64.encode(decoder.decode(font_2)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the embedding bytes back; stands in for a real model.
    struct EchoDecoder;

    impl GlyphDecoder for EchoDecoder {
        fn decode(&self, embedding: &Embedding) -> FontscapeResult<Vec<u8>> {
            Ok(embedding
                .as_slice()
                .iter()
                .flat_map(|f| f.to_le_bytes())
                .collect())
        }
    }

    #[test]
    fn test_interpolation_produces_three_images() {
        let a = Embedding::new(vec![0.0, 0.0]).unwrap();
        let b = Embedding::new(vec![1.0, 1.0]).unwrap();

        let glyphs = interpolate_glyphs(&EchoDecoder, &a, &b, 0.5).unwrap();
        assert!(!glyphs.font_1_image.is_empty());
        assert!(!glyphs.interpolated_image.is_empty());
        assert!(!glyphs.font_2_image.is_empty());

        // Midpoint should differ from both endpoints.
        assert_ne!(glyphs.interpolated_image, glyphs.font_1_image);
        assert_ne!(glyphs.interpolated_image, glyphs.font_2_image);
    }

    #[test]
    fn test_fraction_zero_matches_first_font() {
        let a = Embedding::new(vec![0.25, 0.75]).unwrap();
        let b = Embedding::new(vec![0.5, 0.5]).unwrap();

        let glyphs = interpolate_glyphs(&EchoDecoder, &a, &b, 0.0).unwrap();
        assert_eq!(glyphs.interpolated_image, glyphs.font_1_image);
    }

    #[test]
    fn test_images_are_valid_base64() {
        let a = Embedding::new(vec![0.1]).unwrap();
        let b = Embedding::new(vec![0.9]).unwrap();

        let glyphs = interpolate_glyphs(&EchoDecoder, &a, &b, 0.25).unwrap();
        assert!(BASE64.decode(&glyphs.interpolated_image).is_ok());
    }

    #[test]
    fn test_mismatched_embeddings_fail() {
        let a = Embedding::new(vec![0.1, 0.2]).unwrap();
        let b = Embedding::new(vec![0.9]).unwrap();
        assert!(interpolate_glyphs(&EchoDecoder, &a, &b, 0.5).is_err());
    }
}
