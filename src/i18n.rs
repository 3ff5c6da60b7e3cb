//! Internationalization (i18n) module
//!
//! Picks the UI language from the system locale. Supports English and
//! Chinese Simplified.
//! Note: Log messages remain in English for consistency.

/// Set the rust-i18n locale from the system locale
pub fn init_locale() {
    let system = sys_locale::get_locale();
    let locale = ui_locale(system.as_deref());
    rust_i18n::set_locale(locale);
    tracing::debug!(?system, locale, "UI locale selected");
}

/// Map a system locale name to one of the bundled UI locales
pub fn ui_locale(system: Option<&str>) -> &'static str {
    match system {
        Some(name) if name.to_lowercase().starts_with("zh") => "zh-CN",
        _ => "en",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_locale_mapping() {
        assert_eq!(ui_locale(Some("zh-CN")), "zh-CN");
        assert_eq!(ui_locale(Some("zh_Hans_CN")), "zh-CN");
        assert_eq!(ui_locale(Some("de-DE")), "en");
        assert_eq!(ui_locale(None), "en");
    }

    #[test]
    fn test_bundled_locales_translate() {
        assert_ne!(
            rust_i18n::t!("wizard_title", locale = "en"),
            rust_i18n::t!("wizard_title", locale = "zh-CN")
        );
    }
}
