use super::*;

#[test]
fn slot_wraps_modulo_eight() {
    assert_eq!(scheme_for_slot(0), COLOR_SCHEMES[0]);
    assert_eq!(scheme_for_slot(8), COLOR_SCHEMES[0]);
    assert_eq!(scheme_for_slot(13), COLOR_SCHEMES[5]);
    assert_eq!(scheme_for_slot(23), COLOR_SCHEMES[7]);
}

#[test]
fn schemes_match_hex_palette() {
    assert_eq!(COLOR_SCHEMES[0].bg, Rgba8::opaque(0x66, 0x7e, 0xea));
    assert_eq!(COLOR_SCHEMES[5].accent, Rgba8::opaque(0x33, 0x08, 0x67));
    assert_eq!(COLOR_SCHEMES[6].text, Rgba8::opaque(0x33, 0x33, 0x33));
    assert!(
        COLOR_SCHEMES
            .iter()
            .enumerate()
            .all(|(i, s)| i == 6 || s.text == Rgba8::WHITE)
    );
}
