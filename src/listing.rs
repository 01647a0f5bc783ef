use chrono::{DateTime, NaiveDateTime};
use reqwest::Url;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::models::UploadedFile;
use crate::transport::FileService;

/// Sortable columns, named after the record attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Filename,
    UploadDate,
    Tags,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Filename => "filename",
            SortKey::UploadDate => "uploadDate",
            SortKey::Tags => "tags",
        }
    }

    fn compare(&self, a: &UploadedFile, b: &UploadedFile) -> Ordering {
        match self {
            SortKey::Filename => a.filename.cmp(&b.filename),
            SortKey::UploadDate => upload_date_key(a).cmp(&upload_date_key(b)),
            SortKey::Tags => a.tags.join("|").cmp(&b.tags.join("|")),
        }
    }
}

impl FromStr for SortKey {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filename" => Ok(SortKey::Filename),
            "uploadDate" => Ok(SortKey::UploadDate),
            "tags" => Ok(SortKey::Tags),
            other => Err(ClientError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dates the server formats either way compare chronologically; anything
/// unparseable sorts first, by its raw text.
fn upload_date_key(file: &UploadedFile) -> (Option<NaiveDateTime>, &str) {
    let raw = file.upload_date.as_str();
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.naive_utc()));
    (parsed, raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: SortKey,
    pub reverse: bool,
}

impl SortState {
    /// Same key flips the direction; a new key keeps it.
    pub fn click(&mut self, key: SortKey) {
        if self.key == key {
            self.reverse = !self.reverse;
        }
        self.key = key;
    }

    pub fn sort(&self, files: &mut [&UploadedFile]) {
        files.sort_by(|a, b| {
            let ordering = self.key.compare(a, b);
            if self.reverse { ordering.reverse() } else { ordering }
        });
    }
}

/// Tags a file must all carry to stay visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    tags: Vec<String>,
}

impl FilterState {
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn add(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn matches(&self, file: &UploadedFile) -> bool {
        self.tags.iter().all(|tag| file.tags.contains(tag))
    }
}

/// State behind the file listing page. The snapshot is fetched once and
/// never mutated; ordering and filtering are derived on demand.
#[derive(Debug)]
pub struct ListingWorkflow {
    files: Option<Vec<UploadedFile>>,
    sort: SortState,
    filter: FilterState,
    server_response: Option<String>,
    downloads: Url,
}

impl ListingWorkflow {
    pub fn new(downloads: Url) -> Self {
        Self {
            files: None,
            sort: SortState::default(),
            filter: FilterState::default(),
            server_response: None,
            downloads,
        }
    }

    /// Fetches the snapshot. On failure any previously loaded list is kept.
    pub async fn initialize(&mut self, service: &dyn FileService) -> Result<(), ClientError> {
        match service.fetch_file_list().await {
            Ok(files) => {
                info!(count = files.len(), "File list loaded.");
                self.files = Some(files);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Failed to load file list.");
                self.server_response = Some(message);
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.files.is_some()
    }

    pub fn files(&self) -> &[UploadedFile] {
        self.files.as_deref().unwrap_or_default()
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn server_response(&self) -> Option<&str> {
        self.server_response.as_deref()
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort.click(key);
        debug!(key = %self.sort.key, reverse = self.sort.reverse, "Sort changed.");
    }

    pub fn add_filter_tag(&mut self, tag: impl Into<String>) -> bool {
        self.filter.add(tag)
    }

    pub fn remove_filter_tag(&mut self, tag: &str) -> bool {
        self.filter.remove(tag)
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
    }

    pub fn is_visible(&self, file: &UploadedFile) -> bool {
        self.filter.matches(file)
    }

    pub fn visible_files(&self) -> Vec<&UploadedFile> {
        let mut visible: Vec<&UploadedFile> =
            self.files().iter().filter(|f| self.is_visible(f)).collect();
        self.sort.sort(&mut visible);
        visible
    }

    pub fn download_url(&self, file: &UploadedFile) -> Result<Url, ClientError> {
        let mut url = self.downloads.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Config(format!("Download base {} cannot hold a path", self.downloads))
            })?
            .pop_if_empty()
            .push(&file.filename);
        Ok(url)
    }
}
