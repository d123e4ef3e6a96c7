use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PagevisError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PagevisError::parse("x").to_string().contains("parse error:"));
    assert!(
        PagevisError::asset_load("x")
            .to_string()
            .contains("asset load error:")
    );
    assert!(
        PagevisError::unsupported("x")
            .to_string()
            .contains("unsupported operation:")
    );
    assert!(
        PagevisError::lifecycle("x")
            .to_string()
            .contains("lifecycle error:")
    );
    assert_eq!(PagevisError::NoPage.to_string(), "no page to export");
}

#[test]
fn rendering_wraps_cause_once() {
    let err = PagevisError::rendering(PagevisError::parse("bad unit"));
    assert_eq!(err.code(), "RENDERING_ERROR");
    assert!(err.to_string().contains("bad unit"));

    let source = std::error::Error::source(&err).expect("wrapped cause");
    assert!(source.to_string().contains("parse error:"));

    let again = PagevisError::rendering(err);
    let PagevisError::Rendering { source, .. } = again else {
        panic!("expected rendering error");
    };
    assert_eq!(source.code(), "PARSE_ERROR");
}

#[test]
fn codes_follow_taxonomy() {
    assert_eq!(PagevisError::validation("x").code(), "VALIDATION_ERROR");
    assert_eq!(PagevisError::lifecycle("x").code(), "DESTROYED");
    assert_eq!(PagevisError::NoPage.code(), "NO_PAGE");
    assert_eq!(PagevisError::unsupported("pdf").code(), "UNSUPPORTED");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PagevisError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.code(), "INTERNAL");
}
