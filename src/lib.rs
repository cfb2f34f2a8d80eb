//! Hide password-encrypted payloads in the least-significant bits of RGB images.
//!
//! Conceal path: [`stego_crypto::encrypt`] the plaintext, [`stego::embed`] the
//! envelope into a [`PixelGrid`], save it losslessly with [`carrier::save_png`].
//! Reveal path runs the same steps backwards.

pub mod carrier;
pub mod config;
pub mod stego;
pub mod stego_crypto;

use std::path::Path;

pub use config::Config;
pub use stego::PixelGrid;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Payload too large: need {required_bits} bits, image has {available_bits} channel values")]
    Capacity {
        required_bits: u64,
        available_bits: u64,
    },
    #[error("Image too small or no stego data: need {required_bits} channel values, image has {available_bits}")]
    TruncatedData {
        required_bits: u64,
        available_bits: u64,
    },
    #[error("Envelope is {actual} bytes, shorter than the {minimum}-byte nonce and tag")]
    MalformedEnvelope { actual: usize, minimum: usize },
    #[error("Decryption failed: wrong password or modified image")]
    Integrity,
    #[error("Encryption failed")]
    Encryption,
    #[error("Pixel data is {actual} bytes, which does not fit a {width}x{height} RGB image")]
    InvalidShape { width: u32, height: u32, actual: usize },
    #[error("Password must be at least {minimum} characters")]
    WeakPassword { minimum: usize },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Encrypt `plaintext` under `password` and hide it in a copy of `grid`.
pub fn conceal(
    grid: &PixelGrid,
    plaintext: &[u8],
    password: &str,
    config: &Config,
) -> Result<PixelGrid> {
    config.check_password(password)?;
    let envelope = stego_crypto::encrypt(plaintext, password)?;
    stego::embed(grid, &envelope)
}

/// Recover and decrypt the plaintext hidden in `grid`.
pub fn reveal(grid: &PixelGrid, password: &str) -> Result<Vec<u8>> {
    let envelope = stego::extract(grid)?;
    stego_crypto::decrypt(&envelope, password)
}

/// [`conceal`] over files: any supported cover image in, PNG out.
pub fn conceal_file(
    cover_path: &Path,
    output_path: &Path,
    plaintext: &[u8],
    password: &str,
    config: &Config,
) -> Result<()> {
    let grid = carrier::load_grid(cover_path)?;
    let stego = conceal(&grid, plaintext, password, config)?;
    carrier::save_png(&stego, output_path)
}

/// [`reveal`] over a stego image file.
pub fn reveal_file(stego_path: &Path, password: &str) -> Result<Vec<u8>> {
    let grid = carrier::load_grid(stego_path)?;
    reveal(&grid, password)
}

/// A revealed plaintext, split by whether it reads as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revealed {
    Text(String),
    Binary(Vec<u8>),
}

impl Revealed {
    pub fn classify(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Revealed::Text(text),
            Err(e) => Revealed::Binary(e.into_bytes()),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Revealed::Text(text) => text.into_bytes(),
            Revealed::Binary(bytes) => bytes,
        }
    }
}
