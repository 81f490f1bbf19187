// Contest lifecycle: the shared transition procedure, the batch orchestrators
// built on top of it, and the read-only drift inspection
pub mod batch;
pub mod engine;
pub mod inspect;
pub mod payout;
pub mod result;
pub mod transition;

pub use engine::LifecycleEngine;
pub use result::BatchOperationResult;
pub use transition::TransitionKind;
