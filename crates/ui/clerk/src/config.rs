use std::collections::HashMap;
use std::fs;
use std::{env, path::PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::error;

use crate::action::Action;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Built-in keymap, merged under whatever the user's config file binds.
/// Tokens are the output of [`key_token`].
const DEFAULT_BINDINGS: &str = r#"{
  global: {
    "ctrl-c": "Quit",
    "ctrl-z": "Suspend",
  },
  normal: {
    "q": "Quit",
    "r": "Refresh",
    "l": "Logout",
  },
}"#;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub tick_rate: f64,
    #[serde(default)]
    pub frame_rate: f64,
    #[serde(default)]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            config_dir: PathBuf::new(),
            server_url: DEFAULT_SERVER_URL.into(),
            tick_rate: 4.0,
            frame_rate: 30.0,
            log_level: "info".into(),
        }
    }
}

/// Two-layer keymap: `global` fires in any input mode, `normal` only while
/// no field is focused. User bindings shadow the built-ins per token.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct KeyBindings {
    #[serde(default)]
    pub global: HashMap<String, Action>,
    #[serde(default)]
    pub normal: HashMap<String, Action>,
}

impl KeyBindings {
    pub fn global_action(&self, key: &KeyEvent) -> Option<Action> {
        self.global.get(&key_token(key)).cloned()
    }

    pub fn normal_action(&self, key: &KeyEvent) -> Option<Action> {
        self.normal.get(&key_token(key)).cloned()
    }

    fn merge_defaults(&mut self, defaults: KeyBindings) {
        for (token, action) in defaults.global {
            self.global.entry(token).or_insert(action);
        }
        for (token, action) in defaults.normal {
            self.normal.entry(token).or_insert(action);
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub keybindings: KeyBindings,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref LOG_ENV: String = format!("{}_LOG_LEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

impl Config {
    pub fn new() -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_str().unwrap_or_default())?
            .set_default("config_dir", config_dir.to_str().unwrap_or_default())?
            .set_default("server_url", DEFAULT_SERVER_URL)?
            .set_default("tick_rate", 4.0)?
            .set_default("frame_rate", 30.0)?
            .set_default("log_level", "info")?;

        let sources = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        if !sources
            .iter()
            .any(|(file, _)| config_dir.join(file).exists())
        {
            error!("no config file in {}; running on defaults", config_dir.display());
        }
        for (file, format) in sources {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(format)
                    .required(false),
            );
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;

        let defaults: KeyBindings = json5::from_str(DEFAULT_BINDINGS)
            .map_err(|err| config::ConfigError::Message(err.to_string()))?;
        cfg.keybindings.merge_defaults(defaults);

        Ok(cfg)
    }
}

/// Canonical lookup token for a key event: lowercase modifier prefixes
/// joined with `-`, then the key name (`ctrl-c`, `alt-enter`, `f2`, `q`).
/// Keys without a stable name map to an empty token and never match.
pub fn key_token(key: &KeyEvent) -> String {
    let mut token = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        token.push_str("ctrl-");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        token.push_str("alt-");
    }
    let name = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "backtab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => String::new(),
    };
    if name.is_empty() {
        return String::new();
    }
    token.push_str(&name);
    token
}

pub fn get_data_dir() -> PathBuf {
    DATA_FOLDER.clone().unwrap_or_else(|| {
        project_directory().map_or_else(
            || PathBuf::from(".").join(".data"),
            |dirs| dirs.data_local_dir().to_path_buf(),
        )
    })
}

pub fn get_config_dir() -> PathBuf {
    CONFIG_FOLDER.clone().unwrap_or_else(|| {
        project_directory().map_or_else(
            || PathBuf::from(".").join(".config"),
            |dirs| dirs.config_local_dir().to_path_buf(),
        )
    })
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "issuedesk", env!("CARGO_PKG_NAME"))
}

pub fn ensure_data_and_config_dirs_exist() -> std::io::Result<()> {
    fs::create_dir_all(get_data_dir())?;
    fs::create_dir_all(get_config_dir())?;
    Ok(())
}
