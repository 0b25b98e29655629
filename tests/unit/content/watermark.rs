use super::*;

#[test]
fn blank_falls_back_to_default() {
    assert_eq!(Watermark::new("").unwrap().as_str(), DEFAULT_WATERMARK);
    assert_eq!(Watermark::new("   ").unwrap(), Watermark::default());
    assert_eq!(Watermark::from_option(None).unwrap(), Watermark::default());
}

#[test]
fn keeps_custom_text_trimmed() {
    let w = Watermark::new("  @mybrand ").unwrap();
    assert_eq!(w.as_str(), "@mybrand");
    assert_eq!(w.to_string(), "@mybrand");
}

#[test]
fn length_limit_counts_characters() {
    assert!(Watermark::new("x".repeat(50)).is_ok());
    assert!(Watermark::new("é".repeat(50)).is_ok());

    let err = Watermark::new("x".repeat(51)).unwrap_err();
    assert!(matches!(err, IgError::InvalidInput(_)));
    assert!(err.to_string().contains("watermark too long"));
}
