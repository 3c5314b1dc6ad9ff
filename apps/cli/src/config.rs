use std::{collections::HashMap, fs, time::Duration};

use client_core::DEFAULT_QUIET_PERIOD;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub preview_quiet: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".into(),
            preview_quiet: DEFAULT_QUIET_PERIOD,
        }
    }
}

/// Defaults, then `pagestamp.toml` in the working directory, then environment
/// variables, last writer wins.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("pagestamp.toml") {
        apply_file_settings(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("PAGESTAMP_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("PAGESTAMP_PREVIEW_QUIET_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.preview_quiet = Duration::from_millis(parsed);
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("server_url") {
            settings.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("preview_quiet_ms") {
            if let Ok(parsed) = v.parse::<u64>() {
                settings.preview_quiet = Duration::from_millis(parsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_settings_override_defaults() {
        let mut settings = Settings::default();
        apply_file_settings(
            &mut settings,
            "server_url = \"http://render.internal:9000\"\npreview_quiet_ms = \"250\"\n",
        );
        assert_eq!(settings.server_url, "http://render.internal:9000");
        assert_eq!(settings.preview_quiet, Duration::from_millis(250));
    }

    #[test]
    fn malformed_file_keeps_defaults() {
        let mut settings = Settings::default();
        apply_file_settings(&mut settings, "server_url = [not toml");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unparsable_quiet_period_is_ignored() {
        let mut settings = Settings::default();
        apply_file_settings(&mut settings, "preview_quiet_ms = \"fast\"\n");
        assert_eq!(settings.preview_quiet, DEFAULT_QUIET_PERIOD);
    }
}
