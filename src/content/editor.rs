//! Generic section editor: load, edit locally, save wholesale.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::content::sections::{ContentApi, SectionKey};
use crate::error::ApiResult;
use crate::upload::{UploadFile, UploadKind, Uploader};

/// Local working copy of one content section.
#[derive(Debug)]
pub struct SectionEditor<T> {
    api: ContentApi,
    key: SectionKey,
    saved: T,
    draft: T,
}

impl<T> SectionEditor<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + PartialEq,
{
    /// Fetch the section. A section that does not exist yet starts from `T::default()`.
    pub async fn load(api: ContentApi, key: SectionKey) -> ApiResult<Self> {
        let saved = api.get_section_opt::<T>(&key).await?.unwrap_or_default();
        Ok(Self {
            api,
            key,
            draft: saved.clone(),
            saved,
        })
    }

    pub fn key(&self) -> &SectionKey {
        &self.key
    }

    /// Current working copy.
    pub fn value(&self) -> &T {
        &self.draft
    }

    pub fn edit<F: FnOnce(&mut T)>(&mut self, f: F) {
        f(&mut self.draft);
    }

    pub fn set(&mut self, value: T) {
        self.draft = value;
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.saved
    }

    /// Drop local edits.
    pub fn reset(&mut self) {
        self.draft = self.saved.clone();
    }

    /// Write the working copy back. Clean editors skip the request.
    pub async fn save(&mut self) -> ApiResult<()> {
        if !self.is_dirty() {
            tracing::debug!(section = %self.key, "Nothing to save");
            return Ok(());
        }
        self.api.upsert_section(&self.key, &self.draft).await?;
        self.saved = self.draft.clone();
        Ok(())
    }

    /// Upload a media file, let `embed` place its URL in the draft, then save.
    ///
    /// The draft is left untouched if the upload fails.
    pub async fn save_with_upload<F>(
        &mut self,
        uploader: &Uploader,
        kind: UploadKind,
        file: UploadFile,
        embed: F,
    ) -> ApiResult<()>
    where
        F: FnOnce(&mut T, String),
    {
        let url = uploader.upload(kind, file).await?;
        embed(&mut self.draft, url);
        self.save().await
    }
}
