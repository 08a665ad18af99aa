//! Property-based tests for the request pipeline.
//!
//! - Uploads declaring a non-image media type never reach the engine and
//!   never produce a fingerprinted audit entry.
//! - Repeating an accepted upload is a hit with the same fingerprint and
//!   result, and exactly one record is stored.

use std::sync::Arc;
use std::time::Duration;

use glimpse_api::{ImageProcessor, ProcessError, Upload};
use glimpse_core::{fingerprint, ServiceState, UNKNOWN};
use glimpse_engine::EngineAdapter;
use glimpse_storage::StorageHandles;
use glimpse_test_utils::engines::CountingEngine;
use glimpse_test_utils::generators::{
    arb_filename, arb_image_media_type, arb_non_image_media_type, arb_upload_bytes,
};
use glimpse_test_utils::InMemoryStore;
use proptest::prelude::*;
use serde_json::json;

fn runtime() -> Result<tokio::runtime::Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TestCaseError::fail(format!("runtime: {e}")))
}

type Harness = (ImageProcessor, Arc<InMemoryStore>, Arc<CountingEngine>);

async fn setup() -> Result<Harness, TestCaseError> {
    let store = Arc::new(InMemoryStore::new());
    let engine = Arc::new(CountingEngine::new(json!({"keypoints": 1, "descriptors": [1, 128]})));
    let adapter = Arc::new(EngineAdapter::new(
        engine.clone(),
        Arc::new(ServiceState::new()),
        Duration::from_secs(5),
    ));
    adapter
        .warmup()
        .await
        .map_err(|e| TestCaseError::fail(format!("warmup: {e}")))?;
    let processor = ImageProcessor::new(StorageHandles::shared(store.clone()), adapter, 1 << 20);
    Ok((processor, store, engine))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_non_image_uploads_never_analyzed(
        data in arb_upload_bytes(),
        media_type in arb_non_image_media_type(),
        filename in arb_filename(),
    ) {
        let rt = runtime()?;
        rt.block_on(async {
            let (processor, store, engine) = setup().await?;
            let outcome = processor
                .process(Upload::new(data, Some(&media_type), Some(&filename)))
                .await;
            processor.background().drain().await;

            prop_assert!(matches!(outcome, Err(ProcessError::Validation(_))));
            prop_assert_eq!(engine.analyze_calls(), 0);
            prop_assert!(store.stored_results().is_empty());

            let audit = store.audit_entries();
            prop_assert_eq!(audit.len(), 1);
            prop_assert_eq!(audit[0].fingerprint.as_str(), UNKNOWN);
            Ok(())
        })?;
    }

    #[test]
    fn prop_repeat_upload_is_idempotent_hit(
        data in arb_upload_bytes(),
        media_type in arb_image_media_type(),
        first_name in arb_filename(),
        second_name in arb_filename(),
    ) {
        let rt = runtime()?;
        rt.block_on(async {
            let (processor, store, engine) = setup().await?;

            let first = processor
                .process(Upload::new(data.clone(), Some(&media_type), Some(&first_name)))
                .await
                .map_err(|e| TestCaseError::fail(format!("first: {e}")))?;
            processor.background().drain().await;
            let second = processor
                .process(Upload::new(data.clone(), Some(&media_type), Some(&second_name)))
                .await
                .map_err(|e| TestCaseError::fail(format!("second: {e}")))?;
            processor.background().drain().await;

            prop_assert!(!first.cache_hit);
            prop_assert!(second.cache_hit);
            prop_assert_eq!(&first.fingerprint, &fingerprint(&data));
            prop_assert_eq!(&first.fingerprint, &second.fingerprint);
            prop_assert_eq!(&first.result, &second.result);
            prop_assert_eq!(engine.analyze_calls(), 1);

            let stored = store.stored_results();
            prop_assert_eq!(stored.len(), 1);
            prop_assert_eq!(&stored[0].filename, &first_name);
            Ok(())
        })?;
    }
}
