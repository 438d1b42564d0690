//! Per-run context threaded through every scenario
//!
//! Replaces the hidden cross-scenario coupling of ad-hoc test scripts
//! (module-level result lists, a stashed admin token) with one explicit
//! object: the shared HTTP session, the accumulated report, and whatever
//! opaque references earlier scenarios produced for later ones.

use crate::client::ApiClient;
use crate::config::Config;
use crate::report::Report;

/// Opaque identifiers chained between scenarios within one run.
///
/// Each is set only by the scenario that obtained it from the backend;
/// dependents that find `None` short-circuit with a recorded failure.
#[derive(Debug, Default, Clone)]
pub struct ChainedRefs {
    pub admin_token: Option<String>,
    pub booking_id: Option<String>,
    pub transaction_id: Option<String>,
    pub session_id: Option<String>,
    pub contact_id: Option<String>,
}

pub struct RunContext {
    pub client: ApiClient,
    pub report: Report,
    pub config: Config,
    pub refs: ChainedRefs,
}

impl RunContext {
    pub fn new(client: ApiClient, config: Config) -> Self {
        Self {
            client,
            report: Report::new(),
            config,
            refs: ChainedRefs::default(),
        }
    }

    /// Bearer token for admin endpoints, if the login scenario produced one
    pub fn admin_token(&self) -> Option<&str> {
        self.refs.admin_token.as_deref()
    }
}
