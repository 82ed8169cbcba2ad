use super::*;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(None, "default")]
#[case(Some(""), "default")]
#[case(Some("Bearer token"), "default")]
#[case(Some("Identity=alice"), "alice")]
#[case(Some("Bearer xyz; Identity=bob; Other=1"), "bob")]
#[case(Some("Identity=  carol  "), "carol")]
#[case(Some("Identity=;"), "default")]
#[case(Some("Identity=   ;"), "default")]
#[case(Some("Identity=;Identity=dave"), "dave")]
#[case(Some("Identity=run 42"), "run 42")]
fn test_from_authorization(#[case] header: Option<&str>, #[case] expected: &str) {
    assert_eq!(Identity::from_authorization(header).as_str(), expected);
}

#[test]
fn test_default_identity() {
    let identity = Identity::default();
    assert!(identity.is_default());
    assert_eq!(identity.to_string(), DEFAULT_IDENTITY);
}

#[test]
fn test_new_trims_and_defaults() {
    assert_eq!(Identity::new(" x ").as_str(), "x");
    assert!(Identity::new("   ").is_default());
}

#[rstest]
#[case("alice", "alice")]
#[case("test_run-1.2", "test_run-1.2")]
#[case(".hidden", "~2Ehidden")]
#[case("..", "~2E.")]
#[case("a/b", "a~2Fb")]
#[case("a~b", "a~7Eb")]
#[case("run 42", "run~2042")]
fn test_dir_name(#[case] identity: &str, #[case] expected: &str) {
    assert_eq!(Identity::new(identity).dir_name(), expected);
}

#[test]
fn test_from_dir_name_rejects_foreign_names() {
    assert!(Identity::from_dir_name("").is_none());
    assert!(Identity::from_dir_name("a~2f").is_none());
    assert!(Identity::from_dir_name("a~").is_none());
    assert!(Identity::from_dir_name(".hidden").is_none());
    assert!(Identity::from_dir_name("a~ZZ").is_none());
}

proptest! {
    // Directory names never escape the data directory and always map back.
    #[test]
    fn prop_dir_name_is_safe_and_reversible(value in ".+") {
        let identity = Identity(value);
        let dir = identity.dir_name();

        prop_assert!(!dir.contains('/'));
        prop_assert!(!dir.contains('\\'));
        prop_assert!(!dir.starts_with('.'));
        prop_assert_eq!(Identity::from_dir_name(&dir), Some(identity));
    }

    #[test]
    fn prop_header_value_round_trip(value in "[A-Za-z0-9_-]{1,32}") {
        let header = format!("Bearer abc; Identity={value}; Scope=all");
        let identity = Identity::from_authorization(Some(&header));
        prop_assert_eq!(identity.as_str(), value.as_str());
    }
}
