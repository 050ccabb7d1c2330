use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use blackblog::config::{read_blog, Config, CONFIG_FILE_NAME};
use blackblog::logger::default_log_location;

fn find_config_path() -> Option<PathBuf> {
    if let Ok(cur_dir) = env::current_dir() {
        if cur_dir.join(CONFIG_FILE_NAME).exists() {
            return Some(cur_dir.join(CONFIG_FILE_NAME));
        }
    }

    let cfg_file = dirs::config_dir()?.join("blackblog").join(CONFIG_FILE_NAME);
    if cfg_file.exists() {
        return Some(cfg_file);
    }

    None
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match cfg_path.or_else(find_config_path) {
        Some(path) => path,
        None => return Err(anyhow!("Could not find {} in the current or the user config directory", CONFIG_FILE_NAME)),
    };

    println!("Reading config from {}", config_path.display());
    let mut config = read_blog(&config_path)
        .with_context(|| format!("Could not load blog from {}", config_path.display()))?;

    if let Some(ref mut log) = config.log {
        let location = log.location.get_or_insert_with(default_log_location);
        println!("Log enabled. Files will be written in {}", location.display());
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
