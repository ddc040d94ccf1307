// Subscription lifecycle: who is active, and the task that serves each of them
pub mod registry;
pub mod scheduler;

pub use registry::{Lease, Registry};
pub use scheduler::{Scheduler, StopReason};
