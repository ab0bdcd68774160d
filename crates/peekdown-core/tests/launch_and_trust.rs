use std::path::{Path, PathBuf};

use peekdown_core::config::RegistrarConfig;
use peekdown_core::launch::{host_bundle_from_exe, HostBundle, LaunchContext, LaunchMode};
use peekdown_core::paths::staging_path_for;
use peekdown_core::task::BestEffortTask;
use peekdown_core::trust::entitlements_grant;

const SANDBOX: &str = "com.apple.security.app-sandbox";

#[test]
fn host_bundle_is_derived_from_packaged_executable() {
    assert_eq!(
        host_bundle_from_exe(Path::new("/Applications/Peekdown.app/Contents/MacOS/Peekdown")),
        Some(PathBuf::from("/Applications/Peekdown.app"))
    );
    assert_eq!(
        host_bundle_from_exe(Path::new("/tmp/target/debug/peekdown-registrar")),
        None
    );
    assert_eq!(
        host_bundle_from_exe(Path::new("/tmp/Peekdown/Contents/MacOS/Peekdown")),
        None
    );
}

#[test]
fn registration_requires_packaged_supported_interactive_launch() {
    let ctx = LaunchContext {
        host: Some(HostBundle {
            path: PathBuf::from("/Applications/Peekdown.app"),
            version: "1.0.0".to_string(),
        }),
        exe_name: "Peekdown".to_string(),
        mode: LaunchMode::Interactive,
        os_supported: true,
    };
    assert!(ctx.should_register());

    assert!(!LaunchContext { mode: LaunchMode::Cli, ..ctx.clone() }.should_register());
    assert!(!LaunchContext { os_supported: false, ..ctx.clone() }.should_register());
    assert!(!LaunchContext { host: None, ..ctx }.should_register());
}

#[test]
fn trusted_location_is_rooted_under_applications_dirs() {
    let config = RegistrarConfig::for_roots(Path::new("/Users/alex"), Path::new("/Applications"));

    assert!(config.is_trusted_location(Path::new("/Applications/Peekdown.app")));
    assert!(config.is_trusted_location(Path::new("/Applications/Utilities/Peekdown.app")));
    assert!(config.is_trusted_location(Path::new("/Users/alex/Applications/Peekdown.app")));
    assert!(!config.is_trusted_location(Path::new("/Users/alex/Downloads/Peekdown.app")));
    assert!(!config.is_trusted_location(Path::new("/ApplicationsOld/Peekdown.app")));
    assert!(!config.is_trusted_location(Path::new("/Applications")));
    assert!(!config.is_trusted_location(Path::new("/Applications/../tmp/Peekdown.app")));
    assert!(!config.is_trusted_location(Path::new(
        "/Users/alex/Applications/../Downloads/Peekdown.app"
    )));
}

#[test]
fn helper_paths_follow_host_location() {
    let config = RegistrarConfig::for_roots(Path::new("/Users/alex"), Path::new("/Applications"));
    let host = Path::new("/Users/alex/Applications/Peekdown.app");

    assert_eq!(
        config.helper_source_in(host),
        PathBuf::from("/Users/alex/Applications/Peekdown.app/Contents/Resources/Peekdown Helper.app")
    );
    assert_eq!(
        config.helper_target_for(host),
        PathBuf::from("/Users/alex/Applications/Peekdown Helper.app")
    );
    assert_eq!(
        staging_path_for(&config.helper_target_for(host)),
        PathBuf::from("/Users/alex/Applications/.Peekdown Helper.app.staging")
    );
    assert_eq!(
        config.state_file,
        PathBuf::from("/Users/alex/Library/Application Support/Peekdown/registration-state.json")
    );
}

#[test]
fn entitlements_must_grant_sandbox_capability() {
    let granted = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>com.apple.security.app-sandbox</key>
    <true/>
    <key>com.apple.security.files.user-selected.read-only</key>
    <true/>
</dict>
</plist>"#;
    assert!(entitlements_grant(granted, SANDBOX));

    let denied = granted.replacen("<true/>", "<false/>", 1);
    assert!(!entitlements_grant(&denied, SANDBOX));

    let absent = r#"<plist><dict><key>com.apple.security.network.client</key><true/></dict></plist>"#;
    assert!(!entitlements_grant(absent, SANDBOX));
    assert!(!entitlements_grant("", SANDBOX));
}

#[test]
fn entitlements_only_count_top_level_keys() {
    let nested = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>com.example.profile</key>
    <dict>
        <key>com.apple.security.app-sandbox</key>
        <true/>
    </dict>
</dict>
</plist>"#;
    assert!(!entitlements_grant(nested, SANDBOX));

    let commented = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <!-- <key>com.apple.security.app-sandbox</key><true/> -->
    <key>com.apple.security.network.client</key>
    <true/>
</dict>
</plist>"#;
    assert!(!entitlements_grant(commented, SANDBOX));

    let string_value = r#"<plist version="1.0"><dict><key>com.apple.security.app-sandbox</key><string>true</string></dict></plist>"#;
    assert!(!entitlements_grant(string_value, SANDBOX));
}

#[test]
fn best_effort_task_renders_quoted_sequential_script() {
    let task = BestEffortTask::new("activate-helper")
        .step("xattr", ["-dr", "com.apple.quarantine", "/Applications/Peekdown Helper.app"])
        .step("open", ["-g", "/Applications/Peekdown Helper.app"]);

    assert_eq!(task.label(), "activate-helper");
    assert_eq!(task.steps().len(), 2);
    assert_eq!(
        task.script(),
        "xattr -dr com.apple.quarantine '/Applications/Peekdown Helper.app' ; open -g '/Applications/Peekdown Helper.app'"
    );
    assert!(BestEffortTask::new("empty").is_empty());
}
