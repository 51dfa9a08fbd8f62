//! Shared state handed to every HTTP handler.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{AccountService, FeeService, ReportService};

/// Services and settings the handlers need, behind `web::Data`.
pub struct HttpState {
    /// Account management.
    pub accounts: Arc<AccountService>,
    /// Payment reconciliation.
    pub fees: Arc<FeeService>,
    /// Report refresh.
    pub reports: Arc<ReportService>,
    /// Directory holding the exported report files.
    pub report_dir: PathBuf,
}
