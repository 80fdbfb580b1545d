use std::{io::Write, path::PathBuf};
use anyhow::*;
use log::{debug, warn};

use crate::settings::Settings;

#[cfg(test)]
use mockall::automock;

use super::FileSystem;

#[cfg_attr(test, automock)]
pub trait SettingsManager {
    fn get_or_create(&mut self) -> Result<Settings>;
    fn write(&mut self, settings: &Settings) -> Result<()>;
}

pub struct DefaultSettingsManager<'a, FS: FileSystem> {
    file_system: &'a mut FS,
    path: PathBuf
}

impl<'a, FS: FileSystem> SettingsManager for DefaultSettingsManager<'a, FS> {
    fn get_or_create(&mut self) -> Result<Settings> {

        if self.file_system.exists(&self.path) {
            let file = self.file_system.get_reader(&self.path)?;

            match serde_json::from_reader(file) {
                std::result::Result::Ok(settings) => {
                    debug!("loaded settings from {:?}", self.path);
                    return Ok(settings);
                }
                Err(err) => {
                    warn!("settings at {:?} are unreadable, using defaults: {}", self.path, err);
                    return Ok(Settings::default());
                }
            }
        }

        let settings = Settings::default();
        self.write(&settings)?;

        Ok(settings)
    }

    fn write(&mut self, settings: &Settings) -> Result<()> {
        let mut file = self.file_system.get_writer(&self.path)?;
        let json_str = serde_json::to_string_pretty(&settings)?;

        file.write_all(json_str.as_bytes())?;

        Ok(())
    }
}

impl<'a, FS: FileSystem> DefaultSettingsManager<'a, FS> {
    pub fn new(file_system: &'a mut FS, path: PathBuf) -> Self {
        Self { file_system, path }
    }
}
