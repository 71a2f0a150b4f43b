//! Domain records stored under the back office's data keys.
//!
//! Every type here round-trips through the key-value store as JSON, so the
//! serde field names are the on-the-wire names shared with the browser mirror.

pub mod branch;
pub mod goods_transfer;
pub mod product;
pub mod transfer_plan;

pub use branch::Branch;
pub use goods_transfer::{GoodsTransfer, GoodsTransferLine, TransferStatus};
pub use product::{Product, ProductUnit};
pub use transfer_plan::{ChangeRequest, PlanDraft, PlanLineItem, PlanStatus, RequestType, TransferPlan};
