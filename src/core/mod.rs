//! Reconciliation engine: fetch, index, reconcile, synchronize, count.

pub mod annotations;
pub mod fetch;
pub mod identity;
pub mod plans;
pub mod reconcile;
pub mod registry;
pub mod stats;
pub mod sync;

pub use annotations::{
    AnnotationDefinition, AnnotationName, AnnotationStore, AnnotationValue, HttpAnnotationStore,
};
pub use fetch::{Endpoint, PaginatedFetcher};
pub use identity::DeviceIdentity;
pub use plans::{PlanIndex, PlanIndexCounts, UpdatePlan};
pub use reconcile::{ReconciledDevice, StatusRecord, reconcile};
pub use registry::{DeviceKind, DeviceRecord, DeviceRegistry, RegistryCounts};
pub use stats::{FinalStatistics, RunStatistics};
pub use sync::{
    DeviceOutcome, ResolvedDefinitions, SyncOptions, SyncReport, resolve_definitions, synchronize,
};
