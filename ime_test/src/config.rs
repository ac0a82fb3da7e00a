// SPDX-License-Identifier: GPL-3.0-or-later

use std::str::FromStr;

use log::{LevelFilter, warn};

#[cfg(windows)]
pub(crate) const CONFIG_KEY: &str = r"Software\ImeTest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) prompt: String,
    pub(crate) title: String,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) text_margin: i32,
    pub(crate) candidate_x: i32,
    pub(crate) candidate_y: i32,
    pub(crate) font_face: String,
    pub(crate) font_size: i32,
    pub(crate) log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: "Enter Text (IME)".to_owned(),
            title: "IME TEST".to_owned(),
            width: 640,
            height: 480,
            text_margin: 50,
            candidate_x: 100,
            candidate_y: 100,
            font_face: "Segoe UI".to_owned(),
            font_size: 20,
            log_level: "info".to_owned(),
        }
    }
}

/// Named values that can override the defaults.
pub(crate) trait ConfigSource {
    fn get_string(&self, name: &str) -> Option<String>;
    fn get_u32(&self, name: &str) -> Option<u32>;
}

impl Config {
    pub(crate) fn from_source(source: &impl ConfigSource) -> Config {
        let mut cfg = Config::default();
        if let Some(prompt) = source.get_string("Prompt") {
            cfg.prompt = prompt;
        }
        if let Some(title) = source.get_string("Title") {
            cfg.title = title;
        }
        if let Some(font_face) = source.get_string("FontFace").filter(|face| !face.is_empty()) {
            cfg.font_face = font_face;
        }
        if let Some(level) = source.get_string("LogLevel") {
            match LevelFilter::from_str(&level) {
                Ok(_) => cfg.log_level = level.to_lowercase(),
                Err(_) => warn!("ignoring invalid LogLevel {level:?}"),
            }
        }
        let int = |name: &str, default: i32| {
            source
                .get_u32(name)
                .map(|value| value as i32)
                .unwrap_or(default)
        };
        cfg.width = int("Width", cfg.width).max(1);
        cfg.height = int("Height", cfg.height).max(1);
        cfg.text_margin = int("TextMargin", cfg.text_margin).max(0);
        cfg.candidate_x = int("CandidateX", cfg.candidate_x);
        cfg.candidate_y = int("CandidateY", cfg.candidate_y);
        cfg.font_size = int("FontSize", cfg.font_size).max(1);
        cfg
    }
}

#[cfg(windows)]
mod registry {
    use windows_registry::{CURRENT_USER, Key};

    use super::{CONFIG_KEY, Config, ConfigSource};

    impl ConfigSource for Key {
        fn get_string(&self, name: &str) -> Option<String> {
            Key::get_string(self, name).ok()
        }
        fn get_u32(&self, name: &str) -> Option<u32> {
            Key::get_u32(self, name).ok()
        }
    }

    impl Config {
        pub(crate) fn load() -> Config {
            match CURRENT_USER.open(CONFIG_KEY) {
                Ok(key) => Config::from_source(&key),
                Err(_) => Config::default(),
            }
        }
    }
}

#[cfg(not(windows))]
impl Config {
    pub(crate) fn load() -> Config {
        Config::default()
    }
}
