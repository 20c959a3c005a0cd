use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const LOG_FILE: &str = "nvtelemetry.log";

pub fn data_root(home: &Path) -> PathBuf {
    home.join(".nvtelemetry")
}

pub fn config_path(home: &Path) -> PathBuf {
    data_root(home).join(CONFIG_FILE)
}

pub fn logs_dir(home: &Path) -> PathBuf {
    data_root(home).join("logs")
}

pub fn log_path(home: &Path) -> PathBuf {
    logs_dir(home).join(LOG_FILE)
}
