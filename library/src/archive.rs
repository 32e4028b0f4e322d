use super::{ConfigError, Persist};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Titles of everything downloaded so far, mapped to their remote id.
///
/// Keyed by title: two remote entries sharing a title collapse into one, the
/// one inserted last wins.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveLedger(BTreeMap<String, String>);

impl Persist for ArchiveLedger {}

impl ArchiveLedger {
    /// Loads the ledger, an absent file being an empty ledger.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_or_default(path)
    }

    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.save(path)
    }

    pub fn insert(&mut self, title: impl Into<String>, id: impl Into<String>) -> Option<String> {
        self.0.insert(title.into(), id.into())
    }

    pub fn remove(&mut self, title: &str) -> Option<String> {
        self.0.remove(title)
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.0.get(title).map(String::as_str)
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.0.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(title, id)| (title.as_str(), id.as_str()))
    }
}

impl<T: Into<String>, I: Into<String>> FromIterator<(T, I)> for ArchiveLedger {
    fn from_iter<It: IntoIterator<Item = (T, I)>>(iter: It) -> Self {
        Self(
            iter.into_iter()
                .map(|(title, id)| (title.into(), id.into()))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DownloadRecord {
    pub extractor: String,
    pub id: String,
}

impl DownloadRecord {
    /// Parses `<extractor> <id>`, `None` for lines without an id field.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let extractor = fields.next()?;
        let id = fields.next()?;
        Some(Self {
            extractor: extractor.to_string(),
            id: id.to_string(),
        })
    }
}

impl std::fmt::Display for DownloadRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.extractor, self.id)
    }
}

/// The line oriented `archive.txt` of entries already on disk.
#[derive(Debug)]
pub struct DownloadRecords {
    path: PathBuf,
    records: HashSet<DownloadRecord>,
}

impl DownloadRecords {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_owned();
        let records = match std::fs::read_to_string(&path) {
            Ok(content) => content.lines().filter_map(DownloadRecord::parse).collect(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, extractor: &str, id: &str) -> bool {
        self.records.contains(&DownloadRecord {
            extractor: extractor.to_string(),
            id: id.to_string(),
        })
    }

    pub fn append(&mut self, extractor: &str, id: &str) -> Result<(), ConfigError> {
        let record = DownloadRecord {
            extractor: extractor.to_string(),
            id: id.to_string(),
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record)?;
        self.records.insert(record);
        Ok(())
    }

    /// Rewrites the file without the lines whose id is in `ids`.
    ///
    /// Returns the ids of the dropped lines in file order. Lines that do not
    /// parse are kept untouched.
    pub fn prune(&mut self, ids: &HashSet<&str>) -> Result<Vec<String>, ConfigError> {
        let mut file = match std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let mut kept = String::with_capacity(content.len());
        let mut removed = Vec::new();
        for line in content.lines() {
            match DownloadRecord::parse(line) {
                Some(record) if ids.contains(record.id.as_str()) => {
                    self.records.remove(&record);
                    removed.push(record.id);
                }
                Some(_) => {
                    kept.push_str(line);
                    kept.push('\n');
                }
                None => {
                    if !line.trim().is_empty() {
                        tracing::warn!("keeping malformed download record {:?}", line);
                        kept.push_str(line);
                        kept.push('\n');
                    }
                }
            }
        }

        file.seek(SeekFrom::Start(0))?;
        file.write_all(kept.as_bytes())?;
        file.set_len(kept.len() as u64)?;
        Ok(removed)
    }
}
