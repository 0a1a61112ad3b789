//! Ingestion stage
//!
//! Wraps a [`KolSource`] and turns fetch failure into the `Unavailable`
//! placeholder. Nothing fails past this point.

use std::sync::Arc;
use tracing::{info, warn};

use crate::connectors::{FetchRequest, KolSource};
use common::KolFeed;

/// Output of one ingestion: what is shown to the operator and what is handed
/// downstream. Both carry the same feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub display: KolFeed,
    pub raw: KolFeed,
}

/// KOL ingestion stage
#[derive(Clone)]
pub struct IngestionStage {
    source: Arc<dyn KolSource>,
    request: FetchRequest,
}

impl IngestionStage {
    pub fn new(source: Arc<dyn KolSource>, request: FetchRequest) -> Self {
        Self { source, request }
    }

    pub fn request(&self) -> FetchRequest {
        self.request
    }

    pub async fn ingest(&self) -> Ingested {
        let feed = match self.source.fetch(self.request).await {
            Ok(payload) => {
                info!("✅ KOL raw data fetched");
                KolFeed::Posts(payload)
            }
            Err(e) => {
                warn!("KOL raw data fetch failed, continuing with placeholder: {}", e);
                KolFeed::Unavailable
            }
        };

        Ingested {
            display: feed.clone(),
            raw: feed,
        }
    }
}
