use super::ConfigError;
use serde::{de::DeserializeOwned, Serialize};
use std::io;
use std::path::Path;

/// JSON documents stored in the `.sync` folder.
pub trait Persist: Serialize + DeserializeOwned {
    fn load<P: AsRef<Path>>(config_file: P) -> Result<Self, ConfigError> {
        let buf = std::fs::read_to_string(config_file)?;
        let deser = serde_json::from_str::<Self>(&buf).map_err(ConfigError::ParseError)?;
        Ok(deser)
    }

    /// Like `load`, but a missing file yields the default value.
    fn load_or_default<P: AsRef<Path>>(config_file: P) -> Result<Self, ConfigError>
    where
        Self: Default,
    {
        match Self::load(config_file) {
            Err(ConfigError::IO(err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn save<P: AsRef<Path>>(&self, config_file: P) -> Result<(), ConfigError> {
        let file = open_truncated(config_file)?;
        serde_json::to_writer(&file, &self)?;
        Ok(())
    }

    /// Saves with four space indentation so the file stays easy to edit by hand.
    fn save_pretty<P: AsRef<Path>>(&self, config_file: P) -> Result<(), ConfigError> {
        let file = open_truncated(config_file)?;
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&file, formatter);
        self.serialize(&mut ser)?;
        Ok(())
    }
}

fn open_truncated<P: AsRef<Path>>(path: P) -> io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
