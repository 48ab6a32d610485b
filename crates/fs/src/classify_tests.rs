use super::*;

fn exe_only() -> ExtensionSet {
    ExtensionSet::new(["exe"])
}

#[test]
fn extension_set_normalises_input() {
    let set = ExtensionSet::new([".EXE", "Zip", " msi ", "", "."]);

    assert_eq!(set.len(), 3);
    assert!(set.contains("exe"));
    assert!(set.contains("zip"));
    assert!(set.contains("msi"));
    assert_eq!(set.to_sorted_vec(), vec!["exe", "msi", "zip"]);
}

#[test]
fn recordable_requires_allowed_extension() {
    let allowed = exe_only();

    assert!(is_recordable("a/b/setup.exe", &allowed));
    assert!(is_recordable("a/b/SETUP.EXE", &allowed));
    assert!(!is_recordable("a/b/readme.txt", &allowed));
    assert!(!is_recordable("a/b/exe", &allowed));
    assert!(!is_recordable("a/b/setup.exe.part", &allowed));
}

#[test]
fn recordable_with_empty_set_is_always_false() {
    let none = ExtensionSet::default();
    assert!(none.is_empty());
    assert!(!is_recordable("a/b/setup.exe", &none));
}

#[test]
fn quick_scan_cases() {
    let allowed = exe_only();
    let cases: &[(&str, bool)] = &[
        // No extension: could be a directory
        ("home/user/Downloads", true),
        // Wanted extension
        ("a/b/setup.exe", true),
        // Version-numbered directory names
        ("Tool/2021.3.1", true),
        ("apps/Tool 2021.3", true),
        ("apps/node-v18.1234", true),
        // Plain unwanted files
        ("a/b/readme.txt", false),
        ("a/b/photo.jpeg", false),
        // Too many digits to be a version fragment
        ("a/b/capture.12345", false),
        // Mixed digits and letters
        ("a/b/model.v2", false),
        ("a/b/video.mp4", false),
    ];

    for &(path, expected) in cases {
        assert_eq!(
            quick_scan_should_descend(path, &allowed),
            expected,
            "quick_scan_should_descend({path:?})"
        );
    }
}

#[test]
fn normalize_extension_cases() {
    assert_eq!(normalize_extension(".Zip").as_deref(), Some("zip"));
    assert_eq!(normalize_extension("7z").as_deref(), Some("7z"));
    assert_eq!(normalize_extension("  ").as_deref(), None);
    assert_eq!(normalize_extension(".").as_deref(), None);
}
