use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::ClientError;
use crate::tags::split_tags;

/// A file already stored on the server, as reported by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub filename: String,
    pub upload_date: String,
    #[serde(deserialize_with = "deserialize_pipe_tags", default)]
    pub tags: Vec<String>,
}

/// Body returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub name: String,
    pub upload_date: String,
    #[serde(default)]
    pub tags: String,
}

/// Body returned by the tag lookup endpoint. A missing `tags` means the
/// server has never seen the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub tags: Option<String>,
}

/// Accepts either the wire form (`"a|b"`) or an already split array.
fn deserialize_pipe_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        Joined(String),
        Split(Vec<String>),
        Missing(()),
    }

    Ok(match RawTags::deserialize(deserializer)? {
        RawTags::Joined(raw) => split_tags(&raw).map(str::to_owned).collect(),
        RawTags::Split(tags) => tags,
        RawTags::Missing(()) => Vec::new(),
    })
}

/// A local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub async fn read(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}
