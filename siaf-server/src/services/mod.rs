//! Services
//!
//! - [`BackupService`] - database export into `{work_dir}/backups`

pub mod backup;

pub use backup::{BackupInfo, BackupService};
