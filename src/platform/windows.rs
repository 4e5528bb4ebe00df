// Windows: roaming AppData.

use std::env;
use std::path::PathBuf;

fn app_data_dir() -> PathBuf {
    let base = env::var("APPDATA").unwrap_or_else(|_| {
        let profile = env::var("USERPROFILE").unwrap_or_else(|_| String::from("C:\\Users\\Default"));
        format!("{}\\AppData\\Roaming", profile)
    });
    PathBuf::from(base).join("SmartHistory")
}

pub fn get_config_dir() -> PathBuf {
    app_data_dir()
}

pub fn get_data_dir() -> PathBuf {
    app_data_dir()
}
