// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion orchestration: snapshot the collection, make sure every image's
// dimensions are known, assemble one page per image, and serialise.
//
// Only a finished document or an error ever leaves `convert`. Dropping the
// returned future abandons the run and releases the store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use pagestack_core::error::{PagestackError, Result};
use pagestack_core::{ComposerConfig, LayoutPolicy};
use pagestack_document::{DocumentAssembler, PageSummary, ResolvedAsset};

use crate::store::AssetStore;

/// A serialised PDF ready for delivery.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    /// Suggested file name, e.g. `merged-images.pdf`.
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// What went on each page, in page order.
    pub pages: Vec<PageSummary>,
}

impl ConvertedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Write the PDF to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    /// Write the PDF to `path` without blocking the async runtime.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path.as_ref(), &self.bytes).await?;
        info!("Wrote PDF to {}", path.as_ref().display());
        Ok(())
    }

    /// Write the PDF into `dir` under its suggested file name.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        self.save(&path)?;
        Ok(path)
    }
}

/// Drives a store through layout, assembly, and serialisation.
#[derive(Debug, Clone)]
pub struct Converter {
    config: ComposerConfig,
}

impl Converter {
    /// Build a converter, rejecting layout policies that cannot be honoured.
    pub fn new(config: ComposerConfig) -> Result<Self> {
        config.layout.validate()?;
        Ok(Self { config })
    }

    /// Default file name and title with the given layout.
    pub fn with_policy(layout: LayoutPolicy) -> Result<Self> {
        Self::new(ComposerConfig {
            layout,
            ..ComposerConfig::default()
        })
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Convert the store's current contents into one PDF.
    ///
    /// The order is captured when the call starts; later changes to the
    /// store do not affect this run. A second call on the same store while
    /// this one is running fails with `ConversionInProgress`.
    #[instrument(skip_all, fields(mode = ?self.config.layout.mode))]
    pub async fn convert(&self, store: &AssetStore) -> Result<ConvertedDocument> {
        let _guard = store.begin_conversion()?;

        let pending = store.pending_snapshot();
        if pending.is_empty() {
            return Err(PagestackError::EmptyInput);
        }
        info!(images = pending.len(), "Starting conversion");

        let mut resolved = Vec::with_capacity(pending.len());
        for item in &pending {
            let size = store.resolve(item).await.map_err(|reason| {
                warn!(name = %item.asset.display_name, %reason, "Conversion aborted");
                PagestackError::Decode {
                    asset: item.asset.display_name.clone(),
                    reason,
                }
            })?;
            resolved.push(ResolvedAsset {
                id: item.asset.id,
                display_name: item.asset.display_name.clone(),
                bytes: Arc::clone(&item.asset.bytes),
                size,
            });
        }

        let assembler = DocumentAssembler::new(self.config.title.clone());
        let policy = self.config.layout.clone();
        let (bytes, pages) = tokio::task::spawn_blocking(move || -> Result<_> {
            let document = assembler.build(&resolved, &policy)?;
            let pages = document.pages().to_vec();
            Ok((document.to_bytes()?, pages))
        })
        .await
        .map_err(|err| PagestackError::Serialization(format!("PDF task failed: {err}")))??;

        info!(pages = pages.len(), bytes = bytes.len(), "Conversion finished");
        Ok(ConvertedDocument {
            file_name: self.config.file_name.clone(),
            bytes,
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SlowResolver, broken_png, jpeg, png};
    use pagestack_core::{AssetId, Orientation, PaperSize, PixelSize};
    use std::time::Duration;

    fn page_count(pdf: &[u8]) -> usize {
        lopdf::Document::load_mem(pdf)
            .expect("output parses as PDF")
            .get_pages()
            .len()
    }

    fn slow_store(delay_ms: u64) -> AssetStore {
        AssetStore::with_resolver(Arc::new(SlowResolver::new(Duration::from_millis(delay_ms))))
    }

    #[tokio::test]
    async fn empty_store_fails_fast() {
        let store = AssetStore::new();
        let converter = Converter::with_policy(LayoutPolicy::exact_fit()).unwrap();

        let result = converter.convert(&store).await;
        assert!(matches!(result, Err(PagestackError::EmptyInput)));
        assert!(!store.is_converting());
    }

    #[tokio::test]
    async fn produces_one_page_per_image_in_order() {
        let store = AssetStore::new();
        let a = store.append(png("a.png", 960, 540)).unwrap();
        let b = store.append(jpeg("b.jpg", 200, 400)).unwrap();
        let c = store.append(png("c.png", 300, 300)).unwrap();
        let d = store.append(png("d.png", 120, 80)).unwrap();
        store.move_to(d, 1);

        let converter = Converter::with_policy(LayoutPolicy::exact_fit()).unwrap();
        let document = converter.convert(&store).await.unwrap();

        assert_eq!(document.file_name, "merged-images.pdf");
        assert_eq!(document.page_count(), 4);
        assert_eq!(page_count(&document.bytes), 4);
        let order: Vec<AssetId> = document.pages.iter().map(|p| p.asset).collect();
        assert_eq!(order, vec![a, d, b, c]);

        let first = document.pages[0].layout;
        assert!((first.page_width - 720.0).abs() < 1e-3);
        assert!((first.page_height - 405.0).abs() < 1e-3);
        assert_eq!(first.orientation, Orientation::Landscape);
    }

    #[tokio::test]
    async fn contain_fit_uses_the_configured_paper() {
        let store = AssetStore::new();
        store.append(png("wide.png", 1600, 400)).unwrap();
        store.append(png("tall.png", 400, 1600)).unwrap();

        let policy = LayoutPolicy::contain_fit(PaperSize::A4, Orientation::Landscape, 10.0);
        let document = Converter::with_policy(policy)
            .unwrap()
            .convert(&store)
            .await
            .unwrap();

        for page in &document.pages {
            assert_eq!(page.layout.orientation, Orientation::Landscape);
            assert_eq!((page.layout.page_width, page.layout.page_height), (297.0, 210.0));
            assert!(page.layout.placement.width <= 277.0 + 1e-3);
            assert!(page.layout.placement.height <= 190.0 + 1e-3);
        }
    }

    #[tokio::test]
    async fn decode_failure_names_the_asset_and_yields_no_document() {
        let store = AssetStore::new();
        store.append(png("one.png", 10, 10)).unwrap();
        store.append(broken_png("two.png")).unwrap();
        store.append(png("three.png", 10, 10)).unwrap();

        let converter = Converter::with_policy(LayoutPolicy::exact_fit()).unwrap();
        match converter.convert(&store).await {
            Err(PagestackError::Decode { asset, .. }) => assert_eq!(asset, "two.png"),
            other => panic!("expected Decode for two.png, got {other:?}"),
        }
        assert!(!store.is_converting());
    }

    #[tokio::test]
    async fn works_for_assets_added_without_a_runtime() {
        let store = std::thread::spawn(|| {
            let store = AssetStore::new();
            store.append(png("offline.png", 16, 9)).unwrap();
            store
        })
        .join()
        .unwrap();

        let id = store.snapshot()[0].id;
        assert_eq!(store.dimensions(id), None);

        let document = Converter::with_policy(LayoutPolicy::exact_fit())
            .unwrap()
            .convert(&store)
            .await
            .unwrap();
        assert_eq!(document.page_count(), 1);
        assert_eq!(store.dimensions(id), Some(PixelSize::new(16, 9)));
    }

    #[tokio::test]
    async fn second_concurrent_conversion_is_rejected() {
        let store = slow_store(100);
        store.append(png("a.png", 8, 8)).unwrap();
        store.append(png("b.png", 8, 8)).unwrap();
        let converter = Converter::with_policy(LayoutPolicy::exact_fit()).unwrap();

        let (first, second) = tokio::join!(converter.convert(&store), converter.convert(&store));

        let outcomes = [first, second];
        let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|r| matches!(r, Err(PagestackError::ConversionInProgress)))
            .count();
        assert_eq!((succeeded, rejected), (1, 1));
        assert!(!store.is_converting());
    }

    #[tokio::test]
    async fn abandoned_conversion_releases_the_store() {
        let store = slow_store(200);
        store.append(png("a.png", 8, 8)).unwrap();
        let converter = Converter::with_policy(LayoutPolicy::exact_fit()).unwrap();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), converter.convert(&store)).await;
        assert!(timed_out.is_err());
        assert!(!store.is_converting());

        let document = converter.convert(&store).await.unwrap();
        assert_eq!(document.page_count(), 1);
    }

    #[tokio::test]
    async fn later_reorders_do_not_affect_a_running_conversion() {
        let store = slow_store(60);
        let a = store.append(png("a.png", 8, 8)).unwrap();
        let b = store.append(png("b.png", 8, 8)).unwrap();
        let c = store.append(png("c.png", 8, 8)).unwrap();
        let converter = Converter::with_policy(LayoutPolicy::exact_fit()).unwrap();

        let (result, ()) = tokio::join!(converter.convert(&store), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.move_to(c, 0);
            store.remove(a);
        });

        let document = result.unwrap();
        let order: Vec<AssetId> = document.pages.iter().map(|p| p.asset).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(store.snapshot().iter().map(|x| x.id).collect::<Vec<_>>(), vec![c, b]);
    }

    #[tokio::test]
    async fn saves_under_the_suggested_name() {
        let store = AssetStore::new();
        store.append(png("a.png", 4, 4)).unwrap();
        let document = Converter::with_policy(LayoutPolicy::exact_fit())
            .unwrap()
            .convert(&store)
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = document.save_in(dir.path()).unwrap();
        assert!(path.ends_with("merged-images.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), document.bytes);
    }

    #[tokio::test]
    async fn writes_asynchronously_to_a_chosen_path() {
        let store = AssetStore::new();
        store.append(png("a.png", 4, 4)).unwrap();
        store.append(png("b.png", 6, 2)).unwrap();
        let document = Converter::with_policy(LayoutPolicy::exact_fit())
            .unwrap()
            .convert(&store)
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("album.pdf");
        document.write_to(&path).await.unwrap();

        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, document.bytes);
        assert_eq!(page_count(&written), 2);
    }

    #[tokio::test]
    async fn write_to_a_missing_directory_is_an_io_error() {
        let store = AssetStore::new();
        store.append(png("a.png", 4, 4)).unwrap();
        let document = Converter::with_policy(LayoutPolicy::exact_fit())
            .unwrap()
            .convert(&store)
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let result = document.write_to(dir.path().join("missing").join("out.pdf")).await;
        assert!(matches!(result, Err(PagestackError::Io(_))));
    }

    #[test]
    fn invalid_policy_is_rejected_up_front() {
        let policy = LayoutPolicy {
            output_dpi: 0.0,
            ..LayoutPolicy::exact_fit()
        };
        assert!(matches!(
            Converter::with_policy(policy),
            Err(PagestackError::InvalidPolicy(_))
        ));
    }
}
