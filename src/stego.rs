// LSB steganography over RGB channels: frame = 4-byte length (big-endian) + payload.
// One bit per channel value, MSB-first per byte, starting at the first channel.

use image::RgbImage;

use crate::stego_crypto::ENVELOPE_OVERHEAD;
use crate::{Error, Result};

const CHANNELS: usize = 3;
const LENGTH_BYTES: usize = 4;
const LENGTH_BITS: usize = LENGTH_BYTES * 8;

/// Channel count of a `width x height` RGB grid, `None` if it overflows `usize`.
fn shape_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// An owned RGB raster, `height x width x 3` bytes in row-major then channel order.
///
/// Hidden data only survives if the grid is persisted losslessly (PNG, BMP);
/// any lossy re-encoding silently destroys the LSBs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Build a grid from raw channel values; `data.len()` must equal `width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        match shape_len(width, height) {
            Some(expected) if expected == data.len() => Ok(Self {
                width,
                height,
                data,
            }),
            _ => Err(Error::InvalidShape {
                width,
                height,
                actual: data.len(),
            }),
        }
    }

    /// A grid with every channel of every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        let len = shape_len(width, height).ok_or(Error::InvalidShape {
            width,
            height,
            actual: 0,
        })?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The flattened channel sequence both [`embed`] and [`extract`] walk.
    pub fn channels(&self) -> &[u8] {
        &self.data
    }

    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

impl From<RgbImage> for PixelGrid {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl TryFrom<PixelGrid> for RgbImage {
    type Error = Error;

    fn try_from(grid: PixelGrid) -> Result<Self> {
        let (width, height, actual) = (grid.width, grid.height, grid.data.len());
        RgbImage::from_raw(width, height, grid.data).ok_or(Error::InvalidShape {
            width,
            height,
            actual,
        })
    }
}

fn frame_payload(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len()).map_err(|_| Error::Capacity {
        required_bits: (LENGTH_BYTES as u64 + payload.len() as u64) * 8,
        available_bits: u32::MAX as u64,
    })?;
    let mut out = Vec::with_capacity(LENGTH_BYTES + payload.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

fn lsb_bits(channels: &[u8]) -> impl Iterator<Item = u8> + '_ {
    channels.iter().map(|c| c & 1)
}

fn bits_to_bytes(bits: impl Iterator<Item = u8>, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut byte = 0u8;
    for (i, bit) in bits.take(len * 8).enumerate() {
        byte = (byte << 1) | bit;
        if i % 8 == 7 {
            out.push(byte);
            byte = 0;
        }
    }
    out
}

/// Largest payload (in bytes) a grid can carry after the 32-bit length prefix.
pub fn capacity_bytes(grid: &PixelGrid) -> usize {
    let bytes = grid.channel_count().saturating_sub(LENGTH_BITS) / 8;
    bytes.min(u32::MAX as usize)
}

/// Largest plaintext that still fits once wrapped in an encrypted envelope.
pub fn max_plaintext_len(grid: &PixelGrid) -> usize {
    capacity_bytes(grid).saturating_sub(ENVELOPE_OVERHEAD)
}

/// Write `payload`, length-prefixed, into the channel LSBs of a copy of `grid`.
///
/// Fails with [`Error::Capacity`] before touching anything if the frame does
/// not fit. Channel values past the frame are left bit-for-bit unchanged.
pub fn embed(grid: &PixelGrid, payload: &[u8]) -> Result<PixelGrid> {
    let frame = frame_payload(payload)?;
    let bits_needed = frame.len() as u64 * 8;
    let available = grid.channel_count() as u64;
    if bits_needed > available {
        return Err(Error::Capacity {
            required_bits: bits_needed,
            available_bits: available,
        });
    }

    let mut out = grid.clone();
    let bits = frame
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1));
    for (slot, bit) in out.data.iter_mut().zip(bits) {
        *slot = (*slot & 0xFE) | bit;
    }
    Ok(out)
}

/// Read a length-prefixed payload back out of the channel LSBs.
///
/// There is no integrity check here: any grid whose declared length fits
/// yields bytes. Only [`Error::TruncatedData`] is raised, when the grid
/// cannot hold the length field or the length it declares.
pub fn extract(grid: &PixelGrid) -> Result<Vec<u8>> {
    let channels = grid.channels();
    let available = channels.len() as u64;
    if channels.len() < LENGTH_BITS {
        return Err(Error::TruncatedData {
            required_bits: LENGTH_BITS as u64,
            available_bits: available,
        });
    }

    let len_bytes = bits_to_bytes(lsb_bits(&channels[..LENGTH_BITS]), LENGTH_BYTES);
    let payload_len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);

    let required = LENGTH_BITS as u64 + payload_len as u64 * 8;
    if required > available {
        return Err(Error::TruncatedData {
            required_bits: required,
            available_bits: available,
        });
    }

    Ok(bits_to_bytes(
        lsb_bits(&channels[LENGTH_BITS..]),
        payload_len as usize,
    ))
}
