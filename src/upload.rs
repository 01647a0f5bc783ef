use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::models::{SelectedFile, UploadReceipt};
use crate::router::Route;
use crate::tags::{TagSet, is_valid_tag};
use crate::transport::FileService;

/// An issued tag lookup. Only the most recently issued one may apply its
/// result; see [`UploadWorkflow::finish_tag_lookup`].
#[derive(Debug, Clone)]
pub struct TagLookup {
    pub sequence: u64,
    pub file: SelectedFile,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub message: String,
    pub receipt: UploadReceipt,
    pub navigate_to: Route,
}

/// State behind the upload page: the pending file and the tags the user
/// has attached to it.
#[derive(Debug, Default)]
pub struct UploadWorkflow {
    selected_file: Option<SelectedFile>,
    tags: TagSet,
    bad_tag: bool,
    server_response: Option<String>,
    leftover_text: String,
    lookup_sequence: u64,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn bad_tag(&self) -> bool {
        self.bad_tag
    }

    pub fn server_response(&self) -> Option<&str> {
        self.server_response.as_deref()
    }

    pub fn leftover_text(&self) -> &str {
        &self.leftover_text
    }

    /// Replacing the file also invalidates any lookup still in flight.
    pub fn select_file(&mut self, file: SelectedFile) {
        debug!(file = %file.name, "File selected.");
        self.selected_file = Some(file);
        self.lookup_sequence += 1;
    }

    pub fn set_leftover_text(&mut self, text: impl Into<String>) {
        self.leftover_text = text.into();
    }

    /// Returns whether the candidate is a valid tag. Invalid candidates set
    /// `bad_tag` and are not added.
    pub fn add_tag(&mut self, candidate: &str) -> bool {
        let valid = is_valid_tag(candidate);
        self.bad_tag = !valid;
        if !valid {
            warn!(tag = %candidate, "Rejected tag with invalid characters.");
            return false;
        }
        self.tags.insert(candidate);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn is_form_valid(&self) -> bool {
        self.selected_file.is_some()
    }

    pub fn begin_tag_lookup(&mut self) -> Option<TagLookup> {
        let file = self.selected_file.clone()?;
        self.lookup_sequence += 1;
        Some(TagLookup {
            sequence: self.lookup_sequence,
            file,
        })
    }

    /// Applies a lookup result. Returns `Ok(false)` when a newer lookup has
    /// been issued since, in which case the result (success or failure) is
    /// dropped without touching state.
    pub fn finish_tag_lookup(
        &mut self,
        sequence: u64,
        result: Result<Option<TagSet>, ClientError>,
    ) -> Result<bool, ClientError> {
        if sequence != self.lookup_sequence {
            debug!(
                sequence,
                latest = self.lookup_sequence,
                "Discarding stale tag lookup result."
            );
            return Ok(false);
        }

        match result {
            Ok(Some(existing)) => {
                self.tags = existing.sorted();
                info!(count = self.tags.len(), "Loaded existing tags.");
            }
            Ok(None) => {
                self.tags.clear();
                debug!("No existing tags for selected file.");
            }
            Err(e) => return Err(self.record_failure(e)),
        }
        self.leftover_text.clear();
        Ok(true)
    }

    /// Replaces the current tags with those already stored for the selected
    /// file. `Ok(false)` when no file is selected.
    pub async fn load_existing_tags(
        &mut self,
        service: &dyn FileService,
    ) -> Result<bool, ClientError> {
        let Some(lookup) = self.begin_tag_lookup() else {
            return Ok(false);
        };
        let result = service.fetch_tags_for_file(&lookup.file).await;
        self.finish_tag_lookup(lookup.sequence, result)
    }

    /// Uploads the selected file with the current tags, joined with `|` in
    /// insertion order. Does nothing when `is_form_valid` is false.
    pub async fn submit(
        &mut self,
        is_form_valid: bool,
        service: &dyn FileService,
    ) -> Result<Option<SubmitOutcome>, ClientError> {
        if !is_form_valid {
            debug!("Submit ignored: form is not valid.");
            return Ok(None);
        }
        let file = self
            .selected_file
            .as_ref()
            .ok_or(ClientError::NoFileSelected)?;
        let tag_string = self.tags.to_pipe_string();

        let result = service.upload_file(file, &tag_string).await;
        match result {
            Ok(receipt) => {
                let message = format!(
                    "{} file uploaded successfully at {} with tags: {}",
                    receipt.name, receipt.upload_date, receipt.tags
                );
                self.server_response = Some(message.clone());
                Ok(Some(SubmitOutcome {
                    message,
                    receipt,
                    navigate_to: Route::Files,
                }))
            }
            Err(e) => Err(self.record_failure(e)),
        }
    }

    fn record_failure(&mut self, err: ClientError) -> ClientError {
        let message = err.to_string();
        warn!(error = %message, "Upload page request failed.");
        self.server_response = Some(message);
        err
    }
}
