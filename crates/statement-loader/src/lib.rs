pub mod assemble;
pub mod documents;
pub mod provider;

pub use assemble::assemble_snapshot;
pub use documents::{CompanyProfile, StatementBundle};
pub use provider::{read_snapshot_file, DirectorySnapshotProvider};
