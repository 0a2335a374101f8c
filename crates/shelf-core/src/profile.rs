//! Profile synchronization
//!
//! [`ProfileService`] keeps the user's profile document and its picture
//! in step with the store. Unlike the book-side reads, a failed profile
//! read surfaces as an Error state rather than a silent default; the two
//! policies are deliberate and both run through the combinators in
//! [`crate::state`].

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::debug;

use crate::auth::AuthContext;
use crate::blobs::BlobStore;
use crate::models::UserProfile;
use crate::state::{or_default, ActionState, FetchState};
use crate::store::{paths, StoreError, StoreResult, UserStore};

/// Fields accepted by a profile update
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub second_last_name: String,
    pub birth_date: Option<NaiveDate>,
}

/// Sync service for the profile document and picture blob
pub struct ProfileService<S, B> {
    store: Arc<S>,
    blobs: B,
    auth: AuthContext,
    profile: watch::Sender<FetchState<UserProfile>>,
    update: watch::Sender<ActionState>,
    pending_image: Mutex<Option<Vec<u8>>>,
}

impl<S: UserStore, B: BlobStore> ProfileService<S, B> {
    pub fn new(store: Arc<S>, blobs: B, auth: AuthContext) -> Self {
        Self {
            store,
            blobs,
            auth,
            profile: watch::channel(FetchState::Initial).0,
            update: watch::channel(ActionState::Initial).0,
            pending_image: Mutex::new(None),
        }
    }

    /// Observe the profile document slot
    pub fn subscribe_profile(&self) -> watch::Receiver<FetchState<UserProfile>> {
        self.profile.subscribe()
    }

    /// Observe the outcome of the last profile update
    pub fn subscribe_update(&self) -> watch::Receiver<ActionState> {
        self.update.subscribe()
    }

    /// Load the profile document for the current identity.
    ///
    /// No identity or a missing document resolves to Empty; a failed
    /// read resolves to Error. The stored `uid` field is never trusted
    /// and is overwritten with the authenticated id.
    pub fn load_profile(&self) {
        self.profile.send_replace(FetchState::Loading);
        let Some(uid) = self.auth.current_uid() else {
            self.profile.send_replace(FetchState::Empty);
            return;
        };
        self.profile
            .send_replace(FetchState::from_lookup(self.read_profile(&uid)));
    }

    /// Validate, assemble, and write the profile document in one call.
    ///
    /// Blank first or last name resolves the update slot to Error before
    /// any I/O. A buffered image is uploaded first and its URL stored;
    /// otherwise the previously stored URL is re-fetched and preserved.
    /// On success the profile slot is re-read and the image buffer
    /// cleared; returns whether the document was written.
    pub fn update_profile(&self, update: &ProfileUpdate) -> bool {
        if update.first_name.trim().is_empty() || update.last_name.trim().is_empty() {
            self.update.send_replace(ActionState::Error(
                "first and last name are required".to_string(),
            ));
            return false;
        }
        let Some(uid) = self.auth.current_uid() else {
            return false;
        };

        self.update.send_replace(ActionState::Loading);
        debug!("updating profile for {}", uid);

        let uploaded = {
            let pending = self.pending_image.lock().unwrap_or_else(|e| e.into_inner());
            pending
                .as_deref()
                .map(|bytes| self.blobs.put(&format!("profile_pictures/{}.jpg", uid), bytes))
        };
        let picture_url = match uploaded {
            Some(Ok(url)) => url,
            Some(Err(e)) => {
                self.update
                    .send_replace(ActionState::Error(format!("image upload failed: {}", e)));
                return false;
            }
            None => self.stored_picture_url(&uid),
        };

        let profile = UserProfile {
            uid: uid.clone(),
            first_name: update.first_name.clone(),
            last_name: update.last_name.clone(),
            second_last_name: update.second_last_name.clone(),
            birth_date: update.birth_date,
            profile_picture_url: picture_url,
        };

        if let Err(e) = self.write_profile(&profile) {
            self.update.send_replace(ActionState::Error(e.to_string()));
            return false;
        }

        self.update.send_replace(ActionState::Success);
        self.load_profile();
        self.clear_selected_image();
        true
    }

    /// Buffer an image to be uploaded by the next successful update
    pub fn select_image(&self, bytes: Vec<u8>) {
        *self.pending_image.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes);
    }

    /// Drop the buffered image without uploading it
    pub fn clear_selected_image(&self) {
        *self.pending_image.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn read_profile(&self, uid: &str) -> StoreResult<Option<UserProfile>> {
        let path = paths::profile(uid);
        let Some(value) = self.store.get(&path)? else {
            return Ok(None);
        };
        let mut profile: UserProfile = serde_json::from_value(value)
            .map_err(|e| StoreError::CorruptDocument { path, source: e })?;
        profile.uid = uid.to_string();
        Ok(Some(profile))
    }

    /// The URL already on record, re-fetched so a concurrent writer's
    /// upload is not clobbered by a stale in-memory copy
    fn stored_picture_url(&self, uid: &str) -> String {
        or_default("load stored picture url", self.read_profile(uid))
            .map(|profile| profile.profile_picture_url)
            .unwrap_or_default()
    }

    fn write_profile(&self, profile: &UserProfile) -> Result<()> {
        self.store.set(
            &paths::profile(&profile.uid),
            &serde_json::to_value(profile)?,
        )?;
        Ok(())
    }
}
