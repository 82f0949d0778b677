//! This is the collection of traits re-exported by the hot-swap crate `bistable`.
//! Payload authors implement [`payload::Payload`] and readers depend on [`snapshot::SnapshotSource`],
//! neither needs the engine itself. This provides a minimal dependency for alternate implementations.

pub mod payload;
pub mod snapshot;
