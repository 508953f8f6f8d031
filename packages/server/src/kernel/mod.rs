//! Kernel module - SDK seams and command dispatch.

pub mod cloud;
pub mod commands;
pub mod evaluation;
pub mod invoker;
pub mod test_dependencies;
pub mod traits;
pub mod typed_dispatch;

pub use cloud::{CloudClientFactory, CloudFlagEvaluator, CloudSdkClient};
pub use evaluation::{ErrorCode, EvaluationDetails, ResolutionError};
pub use invoker::{CommandTable, Deferred, Invoker, Operation};
pub use test_dependencies::{MockClientFactory, MockFlagEvaluator, MockSdkClient};
pub use traits::*;
