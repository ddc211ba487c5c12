// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered image collection.
//
// The store is the only owner of page order and membership. Assets are
// addressed by their `AssetId`, never by position, so background dimension
// resolution stays correct while the user reorders or removes images.
// Each asset's resolution is memoised in a `OnceCell`: the first caller runs
// the resolver and every other caller awaits the same result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use pagestack_core::error::{PagestackError, Result};
use pagestack_core::{AssetId, ImageAsset, ImageKind, IncomingImage, PixelSize};
use pagestack_document::{DimensionResolver, ImageDimensionResolver};

/// Outcome of one dimension resolution. The error carries the decoder's reason.
pub(crate) type Resolution = std::result::Result<PixelSize, String>;

struct Entry {
    asset: ImageAsset,
    resolution: Arc<OnceCell<Resolution>>,
}

#[derive(Default)]
struct StoreState {
    entries: Vec<Entry>,
}

impl StoreState {
    fn position(&self, id: AssetId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.asset.id == id)
    }
}

/// Result of ingesting a batch of files.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    /// Ids of the accepted files, in the order they were added.
    pub added: Vec<AssetId>,
    /// Display names of the files that were not PNG or JPEG.
    pub rejected: Vec<String>,
}

/// An asset captured for conversion together with its resolution cell.
pub(crate) struct PendingAsset {
    pub(crate) asset: ImageAsset,
    resolution: Arc<OnceCell<Resolution>>,
}

/// Marks a store as converting until dropped.
pub(crate) struct ConversionGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ConversionGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Ordered, identity-stable collection of image assets.
///
/// Cloning yields another handle to the same collection.
#[derive(Clone)]
pub struct AssetStore {
    state: Arc<Mutex<StoreState>>,
    resolver: Arc<dyn DimensionResolver>,
    converting: Arc<AtomicBool>,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore {
    /// Empty store using the `image`-crate header resolver.
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(ImageDimensionResolver))
    }

    /// Empty store with a custom dimension resolver.
    pub fn with_resolver(resolver: Arc<dyn DimensionResolver>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            resolver,
            converting: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        lock_state(&self.state)
    }

    // -- Mutation -------------------------------------------------------------

    /// Add an image to the end of the collection.
    ///
    /// Only PNG and JPEG are accepted; anything else is rejected with
    /// `Validation` and the collection is left untouched. When called inside
    /// a tokio runtime, dimension resolution starts in the background and
    /// this returns immediately.
    #[instrument(skip(self, file), fields(name = %file.display_name, mime = %file.mime_type))]
    pub fn append(&self, file: IncomingImage) -> Result<AssetId> {
        let Some(kind) = ImageKind::from_mime_type(&file.mime_type) else {
            warn!("rejecting unsupported image type");
            return Err(PagestackError::Validation(file.display_name));
        };

        let asset = ImageAsset::new(file.display_name, kind, file.bytes);
        let id = asset.id;
        let bytes = Arc::clone(&asset.bytes);
        let resolution = Arc::new(OnceCell::new());

        {
            let mut state = self.lock();
            if let Some(existing) = state
                .entries
                .iter()
                .find(|entry| entry.asset.content_hash == asset.content_hash)
            {
                debug!(duplicate_of = %existing.asset.display_name, "same image content added again");
            }
            info!(
                asset_id = %id,
                kind = asset.kind.mime_type(),
                hash = %asset.content_hash,
                added_at = %asset.added_at,
                position = state.entries.len(),
                "image added"
            );
            state.entries.push(Entry {
                asset,
                resolution: Arc::clone(&resolution),
            });
        }

        self.spawn_resolution(id, bytes, resolution);
        Ok(id)
    }

    /// Add several files in order, skipping the unsupported ones.
    pub fn append_many(&self, files: impl IntoIterator<Item = IncomingImage>) -> IngestReport {
        let mut report = IngestReport::default();
        for file in files {
            match self.append(file) {
                Ok(id) => report.added.push(id),
                Err(PagestackError::Validation(name)) => report.rejected.push(name),
                Err(other) => warn!(error = %other, "unexpected ingest failure"),
            }
        }
        report
    }

    /// Remove an asset. Unknown ids are ignored. Returns whether anything
    /// was removed.
    #[instrument(skip_all, fields(asset_id = %id))]
    pub fn remove(&self, id: AssetId) -> bool {
        let mut state = self.lock();
        match state.position(id) {
            Some(index) => {
                let entry = state.entries.remove(index);
                info!(name = %entry.asset.display_name, index, "image removed");
                true
            }
            None => {
                debug!("remove ignored: unknown asset");
                false
            }
        }
    }

    /// Move an asset to `target_index`, shifting the assets in between.
    ///
    /// A target past the end moves the asset to the last position. Unknown
    /// ids and moves onto the current position are no-ops. Returns whether
    /// the order changed.
    #[instrument(skip_all, fields(asset_id = %id))]
    pub fn move_to(&self, id: AssetId, target_index: usize) -> bool {
        let mut state = self.lock();
        let Some(from) = state.position(id) else {
            debug!("move ignored: unknown asset");
            return false;
        };
        let to = target_index.min(state.entries.len() - 1);
        if from == to {
            return false;
        }

        let entry = state.entries.remove(from);
        state.entries.insert(to, entry);
        debug!(from, to, "image moved");
        true
    }

    // -- Queries --------------------------------------------------------------

    /// Ordered copy of the collection. Encoded bytes are shared, not copied.
    pub fn snapshot(&self) -> Vec<ImageAsset> {
        self.lock()
            .entries
            .iter()
            .map(|entry| entry.asset.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Current zero-based position of an asset.
    pub fn position(&self, id: AssetId) -> Option<usize> {
        self.lock().position(id)
    }

    pub fn get(&self, id: AssetId) -> Option<ImageAsset> {
        let state = self.lock();
        state.position(id).map(|index| state.entries[index].asset.clone())
    }

    /// Resolved dimensions, if resolution has finished successfully.
    pub fn dimensions(&self, id: AssetId) -> Option<PixelSize> {
        self.get(id).and_then(|asset| asset.dimensions)
    }

    /// Whether a conversion is currently running on this store.
    pub fn is_converting(&self) -> bool {
        self.converting.load(Ordering::Acquire)
    }

    /// Wait for an asset's dimensions, starting resolution if nothing has
    /// yet. Returns `None` for unknown ids.
    pub async fn wait_for_dimensions(&self, id: AssetId) -> Option<Result<PixelSize>> {
        let pending = {
            let state = self.lock();
            let index = state.position(id)?;
            let entry = &state.entries[index];
            PendingAsset {
                asset: entry.asset.clone(),
                resolution: Arc::clone(&entry.resolution),
            }
        };
        let outcome = self.resolve(&pending).await;
        Some(outcome.map_err(|reason| PagestackError::Decode {
            asset: pending.asset.display_name,
            reason,
        }))
    }

    // -- Conversion support ---------------------------------------------------

    /// Claim the store for one conversion.
    pub(crate) fn begin_conversion(&self) -> Result<ConversionGuard> {
        self.converting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PagestackError::ConversionInProgress)?;
        Ok(ConversionGuard {
            flag: Arc::clone(&self.converting),
        })
    }

    /// Ordered snapshot that keeps each asset's resolution cell.
    pub(crate) fn pending_snapshot(&self) -> Vec<PendingAsset> {
        self.lock()
            .entries
            .iter()
            .map(|entry| PendingAsset {
                asset: entry.asset.clone(),
                resolution: Arc::clone(&entry.resolution),
            })
            .collect()
    }

    /// Resolve one captured asset, joining any resolution already in flight,
    /// and write the result back by id.
    pub(crate) async fn resolve(&self, pending: &PendingAsset) -> Resolution {
        if let Some(size) = pending.asset.dimensions {
            return Ok(size);
        }
        let outcome = resolve_once(
            &pending.resolution,
            Arc::clone(&self.resolver),
            Arc::clone(&pending.asset.bytes),
        )
        .await;
        attach_dimensions(&self.state, pending.asset.id, &outcome);
        outcome
    }

    fn spawn_resolution(&self, id: AssetId, bytes: Arc<[u8]>, cell: Arc<OnceCell<Resolution>>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(asset_id = %id, "no async runtime; dimensions will be resolved on demand");
            return;
        };

        let state = Arc::clone(&self.state);
        let resolver = Arc::clone(&self.resolver);
        handle.spawn(async move {
            let outcome = resolve_once(&cell, resolver, bytes).await;
            attach_dimensions(&state, id, &outcome);
        });
    }
}

fn lock_state(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run the resolver on the blocking pool at most once per cell.
async fn resolve_once(
    cell: &OnceCell<Resolution>,
    resolver: Arc<dyn DimensionResolver>,
    bytes: Arc<[u8]>,
) -> Resolution {
    cell.get_or_init(|| async move {
        match tokio::task::spawn_blocking(move || resolver.resolve(&bytes)).await {
            Ok(Ok(size)) => Ok(size),
            Ok(Err(PagestackError::ImageError(reason))) => Err(reason),
            Ok(Err(other)) => Err(other.to_string()),
            Err(join_err) => Err(format!("dimension task failed: {join_err}")),
        }
    })
    .await
    .clone()
}

/// Record a resolution on the asset with `id`, wherever it now sits.
fn attach_dimensions(state: &Mutex<StoreState>, id: AssetId, outcome: &Resolution) {
    let mut state = lock_state(state);
    let Some(index) = state.position(id) else {
        debug!(asset_id = %id, "asset removed before its dimensions resolved");
        return;
    };
    let asset = &mut state.entries[index].asset;
    match outcome {
        Ok(size) => {
            if asset.dimensions.is_none() {
                debug!(name = %asset.display_name, %size, "dimensions attached");
            }
            asset.dimensions = Some(*size);
        }
        Err(reason) => {
            warn!(name = %asset.display_name, %reason, "dimension resolution failed");
        }
    }
}
