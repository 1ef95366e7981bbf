//! Colour model: integer HSV → RGB and the perceptual gamma table.
//!
//! Hue is in degrees, saturation and value in percent. All arithmetic is
//! integer so the result is identical on host and target.

use smart_leds::RGB8;

/// Convert HSV to linear RGB.
///
/// `hue` is reduced modulo 360; `saturation` and `value` are clamped to 100.
pub fn hsv_to_rgb(hue: u16, saturation: u8, value: u8) -> RGB8 {
    let hue = u32::from(hue % 360);
    let saturation = u32::from(saturation.min(100));
    let value = u32::from(value.min(100));

    let max = value * 255 / 100;
    let min = max * (100 - saturation) / 100;

    let sextant = hue / 60;
    let adj = (max - min) * (hue % 60) / 60;

    let (r, g, b) = match sextant {
        0 => (max, min + adj, min),
        1 => (max - adj, max, min),
        2 => (min, max, min + adj),
        3 => (min, max - adj, max),
        4 => (min + adj, min, max),
        _ => (max, min, max - adj),
    };

    RGB8::new(r as u8, g as u8, b as u8)
}

/// Perceptual correction table for the PWM-driven top LED.
pub const GAMMA: [u8; 256] = [
    0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, //
    2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 4, 4, 4, 4, //
    5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 8, 8, 8, 9, 9, //
    10, 10, 10, 11, 11, 12, 12, 12, 13, 13, 14, 14, 15, 15, 16, 16, //
    17, 17, 18, 18, 19, 19, 20, 20, 21, 21, 22, 23, 23, 24, 24, 25, //
    26, 26, 27, 28, 28, 29, 30, 30, 31, 32, 32, 33, 34, 34, 35, 36, //
    37, 37, 38, 39, 40, 41, 41, 42, 43, 44, 45, 45, 46, 47, 48, 49, //
    50, 51, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, //
    65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77, 78, 80, 81, //
    82, 83, 84, 85, 86, 88, 89, 90, 91, 92, 94, 95, 96, 97, 98, 100, //
    101, 102, 103, 105, 106, 107, 109, 110, 111, 113, 114, 115, 117, 118, 119, 121, //
    122, 123, 125, 126, 128, 129, 130, 132, 133, 135, 136, 138, 139, 141, 142, 144, //
    145, 147, 148, 150, 151, 153, 154, 156, 157, 159, 161, 162, 164, 165, 167, 169, //
    170, 172, 173, 175, 177, 178, 180, 182, 183, 185, 187, 189, 190, 192, 194, 196, //
    197, 199, 201, 203, 204, 206, 208, 210, 212, 213, 215, 217, 219, 221, 223, 225, //
    226, 228, 230, 232, 234, 236, 238, 240, 242, 244, 246, 248, 250, 252, 254, 255,
];

#[inline]
pub fn gamma_correct(channel: u8) -> u8 {
    GAMMA[channel as usize]
}

/// Apply [`gamma_correct`] to each channel.
pub fn gamma_correct_rgb(rgb: RGB8) -> RGB8 {
    RGB8::new(gamma_correct(rgb.r), gamma_correct(rgb.g), gamma_correct(rgb.b))
}
