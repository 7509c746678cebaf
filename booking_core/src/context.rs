//! Run context: configuration plus the authenticated session for one run.

use crate::config::Config;
use crate::session::HttpSession;
use crate::Result;
use uuid::Uuid;

/// Everything a single import run works with
pub struct RunContext<'a> {
    pub config: &'a Config,
    pub session: HttpSession,
    pub run_id: Uuid,
}

impl<'a> RunContext<'a> {
    /// Authenticate against the configured account
    pub fn open(config: &'a Config) -> Result<Self> {
        let session = HttpSession::open(&config.account, &config.http)?;
        Ok(Self {
            config,
            session,
            run_id: Uuid::new_v4(),
        })
    }

    /// Log out; a failed logout is reported but does not fail the run
    pub fn close(self) {
        if let Err(e) = self.session.close() {
            tracing::warn!("Logout failed: {}", e);
        }
    }
}

/// Open a context, run `f` with it and release the session on every path
///
/// The session is logged out whether `f` succeeds or fails; a panic inside
/// `f` still logs out when the session is dropped.
pub fn with_run_context<T, F>(config: &Config, f: F) -> Result<T>
where
    F: FnOnce(&mut RunContext<'_>) -> Result<T>,
{
    let mut ctx = RunContext::open(config)?;
    let span = tracing::info_span!("run", run_id = %ctx.run_id);
    let _enter = span.enter();

    let result = f(&mut ctx);
    ctx.close();
    result
}
