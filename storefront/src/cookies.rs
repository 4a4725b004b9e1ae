//! File-backed cookie storage.
//!
//! The jar is a flat JSON object of string keys to string values. Every
//! write rewrites the whole file; there are few keys and they change rarely.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use mercari_core::{CookieError, CookieStore};

pub const ACTIVE_TAB_COOKIE: &str = "activeTab";
pub const SEARCH_RESULT_COOKIE: &str = "searchResult";

#[derive(Debug)]
pub struct CookieJar {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl CookieJar {
    /// Open the jar at `path`. A missing file is an empty jar.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CookieError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened cookie jar");
        Ok(Self { path, entries })
    }

    pub fn active_tab(&self) -> Option<String> {
        self.get(ACTIVE_TAB_COOKIE)
    }

    pub fn set_active_tab(&mut self, tab: &str) -> Result<(), CookieError> {
        self.set(ACTIVE_TAB_COOKIE, tab)
    }

    /// The last search keyword.
    pub fn search_result(&self) -> Option<String> {
        self.get(SEARCH_RESULT_COOKIE)
    }

    pub fn set_search_result(&mut self, keyword: &str) -> Result<(), CookieError> {
        self.set(SEARCH_RESULT_COOKIE, keyword)
    }

    fn flush(&self) -> Result<(), CookieError> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl CookieStore for CookieJar {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CookieError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), CookieError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
