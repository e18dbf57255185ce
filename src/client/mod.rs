//! Planning client: remote stores, the reconciliation cache and the
//! optimistic mutation executor, plus the page-level aggregator built on
//! top of them.

pub mod cache;
pub mod error;
pub mod mutation;
pub mod notify;
pub mod page;
pub mod resource;
pub mod store;

pub use cache::{CacheEvent, CacheEventKind, CacheKey, Generation, QueryCache};
pub use error::ClientError;
pub use mutation::{OptimisticExecutor, ResourceClient};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use page::{BlockView, PlanPage, PlanStores};
pub use resource::{Heuristics, Policies, Ratings, Resource, Tasks};
pub use store::{HttpStore, PlanApi, RemoteStore};
