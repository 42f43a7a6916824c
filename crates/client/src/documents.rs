//! Abortable document preview fetches.
//!
//! Rapidly switching between documents must not leave stale fetches racing
//! to update the view: selecting a document cancels the superseded fetch
//! outright, and the last selection's bytes are the ones that land.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use avancement_core::types::DbId;

use crate::api::ReviewApi;
use crate::error::ApiResult;

pub struct DocumentPreviewer {
    api: Arc<dyn ReviewApi>,
    current: Mutex<Option<(DbId, CancellationToken)>>,
}

impl DocumentPreviewer {
    pub fn new(api: Arc<dyn ReviewApi>) -> Self {
        Self {
            api,
            current: Mutex::new(None),
        }
    }

    /// Fetch a document's bytes for preview, aborting any fetch a previous
    /// selection left in flight. Returns `ApiError::Cancelled` when this
    /// fetch is itself superseded before completing.
    pub async fn select(&self, document_id: DbId) -> ApiResult<Vec<u8>> {
        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            if let Some((superseded, previous)) = current.replace((document_id, token.clone())) {
                tracing::debug!(document_id = superseded, "Aborting superseded preview fetch");
                previous.cancel();
            }
        }
        self.api.download_document_bytes(document_id, token).await
    }

    /// The document a fetch was last started for, completed or not.
    pub fn selected(&self) -> Option<DbId> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(id, _)| *id)
    }

    /// Abort whatever is in flight, e.g. on teardown of the viewer.
    pub fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, token)) = current.take() {
            token.cancel();
        }
    }
}

impl Drop for DocumentPreviewer {
    fn drop(&mut self) {
        self.cancel();
    }
}
