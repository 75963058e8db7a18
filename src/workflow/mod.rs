//! Run workflow: assembly, identity decisions, status folding

mod assembler;
mod decider;
mod scanner;
mod status;

pub use assembler::{assemble, AssemblyResult};
pub use decider::{decide_project_name_version, DetectorProjectInfo};
pub use scanner::{ProjectModel, ProjectScanner, ScanOutcome};
pub use status::{exit_code_from_error, exit_code_from_statuses, DetectorStatus, ExitCodeType, RunError};
