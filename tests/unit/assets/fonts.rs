use super::*;

#[test]
fn missing_font_file_reports_path() {
    let src = FontSource::File(PathBuf::from("/definitely/not/here.ttf"));
    let err = src.load().unwrap_err().to_string();
    assert!(err.contains("/definitely/not/here.ttf"), "{err}");
}

#[test]
fn in_memory_bytes_are_shared_not_copied() {
    let bytes = Arc::new(vec![1u8, 2, 3]);
    let font = FontSource::Bytes(bytes.clone()).load().unwrap();
    assert_eq!(font.bytes(), &[1, 2, 3]);
    assert_eq!(font.index(), 0);
    assert!(Arc::ptr_eq(&font.bytes, &bytes));
}

#[test]
fn system_font_is_non_empty_when_found() {
    let Ok(font) = FontSource::System.load() else {
        return;
    };
    assert!(!font.bytes().is_empty());
}
