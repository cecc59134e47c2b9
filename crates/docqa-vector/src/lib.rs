//! docqa-vector
//!
//! Flat L2 vector index, the `IndexedCorpus` pairing it with chunk texts, the
//! two-artifact `CorpusStore`, and the ingestion pipeline that produces it.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod corpus;
pub mod distance;
pub mod index;
pub mod ingest;
pub mod store;

pub use corpus::IndexedCorpus;
pub use index::{FlatL2Index, Neighbor, SearchResult, SENTINEL_ID};
pub use ingest::{build_corpus, ingest, IngestReport};
pub use store::CorpusStore;
