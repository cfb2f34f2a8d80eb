// Carrier image I/O: any supported raster in, lossless PNG out.

use image::codecs::png::PngEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader};
use log::debug;
use std::io::{self, BufRead, Cursor, Seek};
use std::path::Path;

use crate::stego::PixelGrid;
use crate::Result;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

fn grid_from_reader<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<PixelGrid> {
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    debug!(
        "decoded carrier {}x{} ({:?}), orientation {:?}",
        img.width(),
        img.height(),
        img.color(),
        orientation
    );
    Ok(PixelGrid::from(img.to_rgb8()))
}

/// Load an image file as an RGB grid. Alpha is dropped; EXIF orientation is applied
/// so the channel order matches what a viewer shows.
pub fn load_grid(path: &Path) -> Result<PixelGrid> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    grid_from_reader(reader)
}

/// Decode an in-memory image (format sniffed from its bytes) as an RGB grid.
pub fn decode_grid(bytes: &[u8]) -> Result<PixelGrid> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    grid_from_reader(reader)
}

fn check_png_signature(bytes: &[u8]) -> Result<()> {
    if bytes.len() < PNG_SIGNATURE.len() || bytes[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "PNG encoder produced non-PNG output",
        )
        .into());
    }
    Ok(())
}

/// Encode a grid as PNG bytes. PNG is lossless, so embedded LSBs survive.
pub fn encode_png(grid: &PixelGrid) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf).write_image(
        grid.channels(),
        grid.width(),
        grid.height(),
        ExtendedColorType::Rgb8,
    )?;
    let out = buf.into_inner();
    check_png_signature(&out)?;
    debug!(
        "encoded {}x{} grid as {} PNG bytes",
        grid.width(),
        grid.height(),
        out.len()
    );
    Ok(out)
}

/// Encode a grid as PNG and write it to `path`, whatever its extension says.
pub fn save_png(grid: &PixelGrid, path: &Path) -> Result<()> {
    let bytes = encode_png(grid)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
