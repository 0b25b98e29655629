use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        IgError::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        IgError::render("a", "x")
            .to_string()
            .starts_with("render error for 'a':")
    );
    assert!(
        IgError::export("b", "x")
            .to_string()
            .starts_with("export error for 'b':")
    );
    assert!(IgError::archive("x").to_string().contains("archive error:"));
    assert!(
        IgError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn item_id_is_reported_for_item_scoped_errors() {
    assert_eq!(IgError::render("post_1", "boom").item_id(), Some("post_1"));
    assert_eq!(IgError::export("post_2", "boom").item_id(), Some("post_2"));
    assert_eq!(IgError::invalid_input("boom").item_id(), None);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = IgError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn chain_message_includes_context() {
    use anyhow::Context as _;
    let res: Result<(), std::io::Error> = Err(std::io::Error::other("disk gone"));
    let err: IgError = res.context("write png").unwrap_err().into();
    let msg = err.chain_message();
    assert!(msg.contains("write png"));
    assert!(msg.contains("disk gone"));
}
