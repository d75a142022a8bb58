use clap::Subcommand;
use serde_json::Value;
use zoneclock_core::storage::{get_json_value_by_path, set_json_value_by_path};
use zoneclock_core::{Config, Settings};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings as JSON
    Show,
    /// Get a setting (e.g. "focus_duration", "micro_break_interval.min")
    Get {
        /// Dot-separated key
        key: String,
    },
    /// Set a setting; the result is validated before it is saved
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: SettingsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = super::open_session(config)?;

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(session.settings())?);
        }
        SettingsAction::Get { key } => {
            let json = serde_json::to_value(session.settings())?;
            match get_json_value_by_path(&json, &key) {
                Some(Value::String(s)) => println!("{s}"),
                Some(other) => println!("{other}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        SettingsAction::Set { key, value } => {
            let mut json = serde_json::to_value(session.settings())?;
            set_json_value_by_path(&mut json, &key, &value)?;
            let settings: Settings = serde_json::from_value(json)?;
            session.update_settings(settings)?;
            println!("ok");
        }
        SettingsAction::Reset => {
            session.update_settings(Settings::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
