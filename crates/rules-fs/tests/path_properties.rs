use proptest::prelude::*;
use rules_fs::NormalizedPath;

proptest! {
    #[test]
    fn test_normalized_paths_never_contain_backslashes(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        prop_assert!(!path.as_str().contains('\\'));
        prop_assert_eq!(NormalizedPath::new(path.to_native()), path);
    }

    #[test]
    fn test_as_dir_is_idempotent(s in "[a-z./_-]{1,24}") {
        let once = NormalizedPath::new(&s).as_dir();
        prop_assert!(once.is_dir_form());
        prop_assert!(!once.as_str().ends_with("//"));
        prop_assert_eq!(once.as_dir(), once);
    }
}
