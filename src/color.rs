//! Conversion between 8-bit sRGB and CIE Lab under the D65 illuminant.
//!
//! Palette distances downstream are plain Euclidean distances in Lab, so the
//! conversion constants here are load-bearing: two implementations that agree
//! on them produce identical palettes and label maps.

use serde::{Deserialize, Serialize};

/// A color in CIE Lab space. `l` is in `[0, 100]`; `a` and `b` are roughly
/// in `[-128, 127]` for colors reachable from sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance to another Lab color.
    pub fn dist_sq(&self, other: &Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }
}

// D65 reference white.
const WHITE_X: f32 = 0.95047;
const WHITE_Y: f32 = 1.0;
const WHITE_Z: f32 = 1.08883;

// Lab nonlinearity breakpoint (6/29)^3 and the CIE linear-segment slope.
const LAB_EPSILON: f32 = 0.008856;
const LAB_KAPPA: f32 = 903.3;

fn srgb_to_linear(c: f32) -> f32 {
    if c >= 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c > 0.003_130_8 {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * c
    }
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

fn lab_f_inv(t: f32) -> f32 {
    let cube = t * t * t;
    if cube > LAB_EPSILON {
        cube
    } else {
        (116.0 * t - 16.0) / LAB_KAPPA
    }
}

/// Convert an 8-bit sRGB color to CIE Lab.
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    let r = srgb_to_linear(r as f32 / 255.0);
    let g = srgb_to_linear(g as f32 / 255.0);
    let b = srgb_to_linear(b as f32 / 255.0);

    let x = (0.4124 * r + 0.3576 * g + 0.1805 * b) / WHITE_X;
    let y = (0.2126 * r + 0.7152 * g + 0.0722 * b) / WHITE_Y;
    let z = (0.0193 * r + 0.1192 * g + 0.9505 * b) / WHITE_Z;

    let fx = lab_f(x);
    let fy = lab_f(y);
    let fz = lab_f(z);

    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// Convert a Lab color back to 8-bit sRGB, clamping channels that fall
/// outside the sRGB gamut.
pub fn lab_to_rgb(lab: &Lab) -> [u8; 3] {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let x = lab_f_inv(fx) * WHITE_X;
    let y = lab_f_inv(fy) * WHITE_Y;
    let z = lab_f_inv(fz) * WHITE_Z;

    let r = 3.2406 * x - 1.5372 * y - 0.4986 * z;
    let g = -0.9689 * x + 1.8758 * y + 0.0415 * z;
    let b = 0.0557 * x - 0.2040 * y + 1.0570 * z;

    let to_byte = |c: f32| (linear_to_srgb(c).clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// Convert a packed RGBA byte buffer to a Lab buffer, ignoring alpha.
pub fn lab_buffer(pixels: &[u8]) -> Vec<Lab> {
    pixels
        .chunks_exact(4)
        .map(|px| rgb_to_lab(px[0], px[1], px[2]))
        .collect()
}
