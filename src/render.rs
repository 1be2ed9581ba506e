//! Code image rendering
//!
//! Pure function from a token's canonical content string to PNG bytes.
//! The content string is hashed with SHA-256 and painted as a 16x16 block
//! mosaic, so the same token and template always yield identical bytes and
//! object-store writes stay idempotent by key.

use crate::error::{Result, WorkerError};
use image::{DynamicImage, GrayImage, Luma, ImageFormat};
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// Grid dimension in modules; 16x16 = 256 bits = one SHA-256 digest.
const MODULES: u32 = 16;
/// Pixels per module.
const SCALE: u32 = 10;
/// Quiet-zone width in modules on each side.
const MARGIN: u32 = 2;

/// Build the canonical content string for a token from the configured
/// URL template (`{token}` placeholder).
pub fn canonical_url(template: &str, token: &str) -> String {
    template.replace("{token}", token)
}

/// Render the canonical content string into PNG image bytes.
pub fn code_png(content: &str) -> Result<Vec<u8>> {
    let digest = Sha256::digest(content.as_bytes());

    let size = (MODULES + 2 * MARGIN) * SCALE;
    let mut img = GrayImage::from_pixel(size, size, Luma([0xFF]));

    for bit in 0..(MODULES * MODULES) {
        let byte = digest[(bit / 8) as usize];
        if (byte >> (bit % 8)) & 1 == 0 {
            continue;
        }
        let module_x = (MARGIN + bit % MODULES) * SCALE;
        let module_y = (MARGIN + bit / MODULES) * SCALE;
        for dy in 0..SCALE {
            for dx in 0..SCALE {
                img.put_pixel(module_x + dx, module_y + dy, Luma([0x00]));
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| WorkerError::Render(e.to_string()))?;

    Ok(buf.into_inner())
}
