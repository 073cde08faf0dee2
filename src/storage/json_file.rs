use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{debug, warn};

use super::PreferenceStore;
use crate::errors::Result;

const TMP_SUFFIX: &str = "tmp";
const CORRUPT_SUFFIX: &str = "corrupt";

/// Preference store persisted as a single JSON object on disk.
///
/// Entries are cached in memory; every write rewrites the whole file by staging
/// it next to the target and renaming over it.
#[derive(Debug, Clone)]
pub struct JsonFilePreferences {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFilePreferences {
    /// Opens the store at `path`. A missing file starts empty. A file that is
    /// not a JSON object is moved aside to `<file>.corrupt` and the store
    /// starts empty so the application stays launchable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let entries = if path.exists() {
            let data = fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, Value>>(&data) {
                Ok(entries) => entries,
                Err(err) => {
                    let aside = sidecar_path(&path, CORRUPT_SUFFIX);
                    warn!(
                        "preferences file `{}` is unreadable ({}); moving it to `{}`",
                        path.display(),
                        err,
                        aside.display()
                    );
                    fs::rename(&path, &aside)?;
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!("opened preferences at {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush_to_disk(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = sidecar_path(&self.path, TMP_SUFFIX);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(err) = self.flush_to_disk() {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.entries.remove(key) {
            if let Err(err) = self.flush_to_disk() {
                self.entries.insert(key.to_string(), old);
                return Err(err);
            }
        }
        Ok(())
    }
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sidecar = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    sidecar.set_extension(ext);
    sidecar
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
