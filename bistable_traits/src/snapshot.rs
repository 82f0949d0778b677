use std::sync::Arc;

/// Fetches the currently published payload as a shared, immutable snapshot. Implementors swap
/// snapshots atomically, so on typical processor architectures this is a lock-free read. Snapshots
/// are cheap because they are shared and can be cloned without locking.
///
/// A snapshot stays valid for as long as the caller holds it, even after a newer one has been
/// published. Callers should pick up updates by dropping their snapshot and requesting a new one
/// at a transactional boundary. For example:
///
/// - In a polling thread, get a new snapshot at the beginning of each iteration, keeping it for the full iteration.
/// - In a request handler, get a snapshot when the request arrives and keep it until a response is returned.
pub trait SnapshotSource<T> {
    /// Get a shared copy of the currently published payload.
    fn latest_snapshot(&self) -> Arc<T>;
}
