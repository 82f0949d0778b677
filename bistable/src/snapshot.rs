//! # Snapshot Sources
//!
//! Code that only reads the buffered payload should depend on [`SnapshotSource`] rather than on
//! [`DoubleBuffer`][crate::double_buffer::DoubleBuffer] itself, usually as a
//! [`SharedSnapshotSource`]. This keeps the reload machinery out of the consumer's signature, and a
//! [`FixedSource`] can stand in for the container under test.
//!
//! ## Depending on Part of a Payload
//!
//! A consumer that needs only a piece of the payload can receive a [`ProjectedSource`] of just that
//! piece, which still tracks reloads of the whole:
//!
//! ```rust
//! # use std::sync::Arc;
//! # use bistable::snapshot::{map_shared_source, FixedSource, SharedSnapshotSource};
//! struct Routes {
//!     upstreams: Arc<Vec<String>>,
//!     default_timeout_ms: u64,
//! }
//!
//! let routes = Arc::new(FixedSource::new(Routes {
//!     upstreams: Arc::new(vec!["10.0.0.1:80".to_string()]),
//!     default_timeout_ms: 500,
//! }));
//!
//! fn balancer(upstreams: SharedSnapshotSource<Vec<String>>) -> usize {
//!     upstreams.latest_snapshot().len()
//! }
//!
//! assert_eq!(1, balancer(map_shared_source(&routes, |routes: &Routes| routes.upstreams.clone())));
//! ```

use std::{fmt, marker::PhantomData, sync::Arc};

pub use bistable_traits::snapshot::SnapshotSource;

/// A type-erased [`SnapshotSource`] that can be shared across threads.
pub type SharedSnapshotSource<T> = Arc<dyn SnapshotSource<T> + Send + Sync>;

/// Erases an owned source, typically a [`DoubleBuffer`][crate::double_buffer::DoubleBuffer], into a
/// [`SharedSnapshotSource`]. The source is dropped with the last clone of the returned handle.
pub fn into_shared_source<T, S>(source: S) -> SharedSnapshotSource<T>
where
    T: 'static,
    S: SnapshotSource<T> + Send + Sync + 'static,
{
    Arc::new(source)
}

/// Creates a [`SharedSnapshotSource`] for a part of the payload of the given source. See
/// [`ProjectedSource`].
pub fn map_shared_source<T, U, S, F>(source: &Arc<S>, project: F) -> SharedSnapshotSource<U>
where
    S: SnapshotSource<T> + ?Sized + Send + Sync + 'static,
    T: 'static,
    U: 'static,
    F: Fn(&T) -> Arc<U> + Send + Sync + 'static,
{
    Arc::new(ProjectedSource::<S, T, F>::new(source.clone(), project))
}

/// Source of a part `U` of the snapshots of another source.
///
/// `project` runs against the upstream's latest snapshot on every call to
/// [`SnapshotSource::latest_snapshot`], so the projection follows reloads. Returning an `Arc` the
/// payload already holds keeps the projection a reference count increment.
pub struct ProjectedSource<S: ?Sized, T, F> {
    upstream: Arc<S>,
    project: F,
    phantom: PhantomData<fn(&T)>,
}

impl<S: ?Sized, T, F> ProjectedSource<S, T, F> {
    pub fn new(upstream: Arc<S>, project: F) -> Self {
        Self {
            upstream,
            project,
            phantom: PhantomData,
        }
    }
}

impl<S, T, U, F> SnapshotSource<U> for ProjectedSource<S, T, F>
where
    S: SnapshotSource<T> + ?Sized,
    F: Fn(&T) -> Arc<U>,
{
    fn latest_snapshot(&self) -> Arc<U> {
        let snapshot = self.upstream.latest_snapshot();
        (self.project)(&snapshot)
    }
}

/// A source that never reloads: every snapshot is the same `Arc`.
pub struct FixedSource<T>(Arc<T>);

impl<T> FixedSource<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl<T: Send + Sync + 'static> FixedSource<T> {
    /// Shorthand for a [`SharedSnapshotSource`] over a fixed value.
    pub fn shared(value: T) -> SharedSnapshotSource<T> {
        Arc::new(Self::new(value))
    }
}

impl<T> From<Arc<T>> for FixedSource<T> {
    fn from(snapshot: Arc<T>) -> Self {
        Self(snapshot)
    }
}

impl<T> SnapshotSource<T> for FixedSource<T> {
    fn latest_snapshot(&self) -> Arc<T> {
        self.0.clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for FixedSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FixedSource").field(&self.0).finish()
    }
}
