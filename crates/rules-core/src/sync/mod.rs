//! Rule sync to agent folders
//!
//! Copies the filtered rule corpus into each enabled agent folder, resolving
//! conflicts per the configured strategy and removing orphaned rule files.

mod result;
mod service;
mod status;

pub use result::{SyncAction, SyncResult};
pub use service::SyncService;
pub use status::{FolderStatus, SyncState};
