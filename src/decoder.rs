//! Decode capability: the opaque "bytes → raster or error" seam. The
//! production decoder sniffs the format with the `image` crate; tests
//! substitute gated or counting decoders through the trait.

use image::DynamicImage;
use std::io::Read;

use crate::error::DecodeError;

/// Decodes one extracted byte stream into a raster image.
pub trait PageDecoder: Send + Sync {
    fn decode(&self, reader: &mut dyn Read) -> Result<DynamicImage, DecodeError>;
}

/// Production decoder backed by the `image` crate's format sniffing.
#[derive(Default)]
pub struct ImagePageDecoder;

impl PageDecoder for ImagePageDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<DynamicImage, DecodeError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        if bytes.is_empty() {
            return Err(DecodeError::Invalid("empty stream".to_string()));
        }
        image::load_from_memory(&bytes).map_err(|e| DecodeError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::io::Cursor;

    #[test]
    fn decodes_a_png_stream() {
        let img = DynamicImage::new_rgb8(3, 2);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();

        let decoded = ImagePageDecoder
            .decode(&mut Cursor::new(buf.into_inner()))
            .unwrap();
        assert_eq!(decoded.width(), 3);
        assert_eq!(decoded.height(), 2);
    }

    #[test]
    fn empty_stream_is_invalid() {
        let err = ImagePageDecoder.decode(&mut Cursor::new(Vec::new()));
        assert!(matches!(err, Err(DecodeError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = ImagePageDecoder.decode(&mut Cursor::new(vec![0xde, 0xad, 0xbe, 0xef]));
        assert!(matches!(err, Err(DecodeError::Invalid(_))));
    }
}
