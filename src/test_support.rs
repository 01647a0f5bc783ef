use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::ClientError;
use crate::models::{SelectedFile, UploadReceipt, UploadedFile};
use crate::tags::TagSet;
use crate::transport::FileService;

/// In-memory [`FileService`] that records every call.
#[derive(Default)]
pub struct FakeFileService {
    pub files: Vec<UploadedFile>,
    pub existing_tags: Option<String>,
    pub failure: Option<(u16, String)>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFileService {
    pub fn failing(status: u16, status_text: &str) -> Self {
        Self {
            failure: Some((status, status_text.to_string())),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: String) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some((status, text)) => Err(ClientError::transport(*status, text.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FileService for FakeFileService {
    async fn fetch_file_list(&self) -> Result<Vec<UploadedFile>, ClientError> {
        self.record("list".into())?;
        Ok(self.files.clone())
    }

    async fn fetch_tags_for_file(
        &self,
        file: &SelectedFile,
    ) -> Result<Option<TagSet>, ClientError> {
        self.record(format!("tags:{}", file.name))?;
        Ok(self
            .existing_tags
            .as_deref()
            .map(TagSet::from_pipe_delimited)
            .filter(|set| !set.is_empty()))
    }

    async fn upload_file(
        &self,
        file: &SelectedFile,
        tags: &str,
    ) -> Result<UploadReceipt, ClientError> {
        self.record(format!("upload:{}:{tags}", file.name))?;
        Ok(UploadReceipt {
            name: file.name.clone(),
            upload_date: "2016-03-03 10:00:00".into(),
            tags: tags.to_string(),
        })
    }
}

pub fn file(filename: &str, upload_date: &str, tags: &[&str]) -> UploadedFile {
    UploadedFile {
        filename: filename.to_string(),
        upload_date: upload_date.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}
