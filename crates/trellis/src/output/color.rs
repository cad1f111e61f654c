//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:        green   (completed actions)
//!   - Warning:        yellow  (skipped records, signature conflicts)
//!   - Error:          red     (cycles)
//!   - Info/Reference: cyan    (feature names, root tree node)
//!   - Muted:          dimmed  (scopes, connectors, markers)
//!   - Emphasis:       bold    (section headers)

use crate::domain::FeatureId;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply dimmed style to text.
pub fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Feature title in cyan, followed by its dimmed location.
///
/// `Checkout [Shop/Cart@1.0]`
pub fn colorize_feature(id: &FeatureId, config: &OutputConfig) -> String {
    let location = if id.group.is_empty() {
        format!("[{}@{}]", id.product, id.version)
    } else {
        format!("[{}/{}@{}]", id.product, id.group, id.version)
    };
    format!("{} {}", info(&id.title, config), dimmed(&location, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::set_override;
    use std::sync::{Mutex, MutexGuard};

    static GLOBAL_STATE_MUTEX: Mutex<()> = Mutex::new(());

    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = GLOBAL_STATE_MUTEX.lock().unwrap();
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    #[test]
    fn test_colors_disabled_returns_plain_text() {
        let config = OutputConfig::new(false, false);
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(error("bad", &config), "bad");
        assert_eq!(warning("hmm", &config), "hmm");
        assert_eq!(bold("title", &config), "title");
    }

    #[test]
    fn test_colors_enabled_adds_ansi_codes() {
        let _guard = ColorGuard::new();
        let config = OutputConfig::new(false, true);

        let text = info("Checkout", &config);

        assert!(text.contains("Checkout"));
        assert!(text.contains("\x1b["), "expected ANSI codes, got: {text:?}");
    }

    #[test]
    fn test_colorize_feature_location() {
        let config = OutputConfig::new(false, false);

        let grouped = colorize_feature(&FeatureId::new("Shop", "Cart", "Add", "1"), &config);
        let ungrouped = colorize_feature(&FeatureId::new("Shop", "", "Add", "1"), &config);

        assert_eq!(grouped, "Add [Shop/Cart@1]");
        assert_eq!(ungrouped, "Add [Shop@1]");
    }
}
