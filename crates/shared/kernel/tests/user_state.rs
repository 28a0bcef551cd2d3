use apanel_kernel::domain::user::{BackendUser, PanelTsConfig, UserSettings};
use apanel_kernel::user_state::{is_activated_for_user, is_hidden_for_user, is_open, should_render};

#[test]
fn test_inactive_without_backend_user() {
    assert!(!is_activated_for_user(None));
    assert!(!is_open(None));
    assert!(!is_hidden_for_user(None));
    assert!(!should_render(None, true));
}

#[test]
fn test_inactive_without_enablement() {
    let user = BackendUser::new("editor");
    assert!(!is_activated_for_user(Some(&user)));

    let user = BackendUser::new("editor").with_tsconfig(PanelTsConfig::default().enable("preview", false));
    assert!(!is_activated_for_user(Some(&user)));
}

#[test]
fn test_active_with_one_module_or_catch_all() {
    let one = BackendUser::new("editor").with_tsconfig(PanelTsConfig::default().enable("preview", true));
    let all = BackendUser::new("admin").with_tsconfig(PanelTsConfig::default().enable_all());

    assert!(is_activated_for_user(Some(&one)));
    assert!(is_activated_for_user(Some(&all)));
}

#[test]
fn test_hidden_and_open_are_independent() {
    for hide in [false, true] {
        for open in [false, true] {
            let user = BackendUser::new("editor")
                .with_tsconfig(PanelTsConfig::default().enable_all().hidden(hide))
                .with_settings(UserSettings::default().open(open));

            assert_eq!(is_hidden_for_user(Some(&user)), hide);
            assert_eq!(is_open(Some(&user)), open);
            assert!(is_activated_for_user(Some(&user)));
        }
    }
}

#[test]
fn test_render_requires_site_switch_and_visible_user() {
    let user = BackendUser::new("editor").with_tsconfig(PanelTsConfig::default().enable_all());
    assert!(should_render(Some(&user), true));
    assert!(!should_render(Some(&user), false));

    let hidden = BackendUser::new("editor").with_tsconfig(PanelTsConfig::default().enable_all().hidden(true));
    assert!(!should_render(Some(&hidden), true));
}
