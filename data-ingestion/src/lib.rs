//! Data Ingestion - Layer 0
//!
//! Acquires the Twitter KOL posts feed under parameter clamping and a request
//! timeout, and downgrades fetch failures into a placeholder so the rest of
//! the pipeline keeps running.

pub mod connectors;
pub mod ingest;

pub use connectors::{FetchRequest, KolConnector, KolSource, StaticKolSource, MAX_ITEM_LIMIT};
pub use ingest::{Ingested, IngestionStage};
