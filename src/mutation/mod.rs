// Optimistic mutation module
// Local apply, background persistence and rollback of drag results

pub mod collection;
pub mod coordinator;
pub mod persistence;

pub use collection::ItemCollection;
pub use coordinator::{
    CandidateUpdate, MutationFailure, MutationTicket, OptimisticMutationCoordinator,
    PendingMutation, Reconciliation, NO_OP_KEY_TOLERANCE,
};
pub use persistence::{ItemPatch, MutationOrigin, PersistenceQueue, PersistenceReport};
