use super::*;
use serial_test::serial;

#[test]
fn default_extensions_are_lowercase_without_dots() {
    for ext in DEFAULT_EXTENSIONS {
        assert_eq!(*ext, ext.to_ascii_lowercase(), "{ext} should be lowercase");
        assert!(!ext.starts_with('.'), "{ext} should not carry a dot");
    }
    assert_eq!(default_extensions().len(), DEFAULT_EXTENSIONS.len());
}

#[test]
#[serial]
fn xdg_or_home_prefers_xdg_variable() {
    unsafe { std::env::set_var("TRAWL_TEST_XDG", "/tmp/xdg-root") };
    assert_eq!(
        xdg_or_home("TRAWL_TEST_XDG", ".cache"),
        PathBuf::from("/tmp/xdg-root")
    );
    unsafe { std::env::remove_var("TRAWL_TEST_XDG") };
}

#[test]
#[serial]
fn store_path_env_override() {
    unsafe { std::env::set_var(PROGRAM_STORE_PATH, "/tmp/elsewhere/records.bin") };
    assert_eq!(
        default_store_path(),
        PathBuf::from("/tmp/elsewhere/records.bin")
    );

    // Empty value is treated as unset.
    unsafe { std::env::set_var(PROGRAM_STORE_PATH, "") };
    let p = default_store_path();
    assert!(p.ends_with(PathBuf::from(PROGRAM_NAME).join(STORE_FILE_NAME)));

    unsafe { std::env::remove_var(PROGRAM_STORE_PATH) };
}

#[test]
#[serial]
fn xdg_or_home_ignores_empty_variable() {
    unsafe { std::env::set_var("TRAWL_TEST_XDG", "") };
    let p = xdg_or_home("TRAWL_TEST_XDG", ".cache");
    assert!(p.ends_with(".cache"));
    unsafe { std::env::remove_var("TRAWL_TEST_XDG") };
}

#[test]
fn scan_root_is_never_empty() {
    assert!(!default_scan_root().as_os_str().is_empty());
}
