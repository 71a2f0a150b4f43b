//! Transfer-plan business logic, independent of how the data is stored or shown.

pub mod conversion;
pub mod lifecycle;
pub mod master;
pub mod numbering;
pub mod registry;
pub mod workflow;

pub use master::MasterData;
pub use registry::{PlanFilter, TransferPlanRegistry};
pub use workflow::TransferWorkflow;
