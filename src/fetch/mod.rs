// src/fetch/mod.rs

pub mod download;
pub mod sources;

pub use download::{acquire, build_client, Acquired};
pub use sources::{CandidateList, Compression, SourceCandidate};
