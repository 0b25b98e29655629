use crate::foundation::core::Rgba8;

/// Background gradient and text colors for one generated canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorScheme {
    /// Gradient start color.
    pub bg: Rgba8,
    /// Gradient end color.
    pub accent: Rgba8,
    /// Content, watermark and outline color.
    pub text: Rgba8,
}

const WHITE: Rgba8 = Rgba8::WHITE;

pub const COLOR_SCHEMES: [ColorScheme; 8] = [
    ColorScheme {
        bg: Rgba8::opaque(0x66, 0x7e, 0xea),
        accent: Rgba8::opaque(0x76, 0x4b, 0xa2),
        text: WHITE,
    },
    ColorScheme {
        bg: Rgba8::opaque(0xf0, 0x93, 0xfb),
        accent: Rgba8::opaque(0xf5, 0x57, 0x6c),
        text: WHITE,
    },
    ColorScheme {
        bg: Rgba8::opaque(0x4f, 0xac, 0xfe),
        accent: Rgba8::opaque(0x00, 0xf2, 0xfe),
        text: WHITE,
    },
    ColorScheme {
        bg: Rgba8::opaque(0x43, 0xe9, 0x7b),
        accent: Rgba8::opaque(0x38, 0xf9, 0xd7),
        text: WHITE,
    },
    ColorScheme {
        bg: Rgba8::opaque(0xfa, 0x70, 0x9a),
        accent: Rgba8::opaque(0xfe, 0xe1, 0x40),
        text: WHITE,
    },
    ColorScheme {
        bg: Rgba8::opaque(0x30, 0xcf, 0xd0),
        accent: Rgba8::opaque(0x33, 0x08, 0x67),
        text: WHITE,
    },
    ColorScheme {
        bg: Rgba8::opaque(0xa8, 0xed, 0xea),
        accent: Rgba8::opaque(0xfe, 0xd6, 0xe3),
        text: Rgba8::opaque(0x33, 0x33, 0x33),
    },
    ColorScheme {
        bg: Rgba8::opaque(0xff, 0x9a, 0x9e),
        accent: Rgba8::opaque(0xfe, 0xcf, 0xef),
        text: WHITE,
    },
];

/// Scheme for the item at position `slot` in its batch.
pub fn scheme_for_slot(slot: usize) -> ColorScheme {
    COLOR_SCHEMES[slot % COLOR_SCHEMES.len()]
}

#[cfg(test)]
#[path = "../../tests/unit/render/scheme.rs"]
mod tests;
