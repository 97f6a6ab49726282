//! The screening entry point.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::model::{CallResponse, IncomingCall};
use crate::Result;
use crate::config::{DEFAULT_SPAM_TIMEOUT_MS, DEFAULT_STORE_TIMEOUT_MS, ScreeningConfig};
use crate::decision::{BlockDecision, BlockReason, match_rules, normalize};
use crate::history::DecisionLog;
use crate::rules::RuleRepository;
use crate::spam::{SpamList, SpamOracle};

/// Reason recorded when a block carries no reason.
const UNKNOWN_REASON: &str = "Unknown";

/// Default number of spam lookups that may run at once.
pub const DEFAULT_SPAM_LOOKUP_LIMIT: usize = 8;

/// Screens incoming calls against the stored rules and a spam oracle.
///
/// Every call gets exactly one [`CallResponse`]. Infrastructure problems
/// (an unreadable rule store, a slow or crashing oracle) never block a call:
/// the screener logs a warning and lets the call through.
#[derive(Clone)]
pub struct CallScreener {
    rules: RuleRepository,
    log: DecisionLog,
    oracle: Arc<dyn SpamOracle>,
    spam_lookups: Arc<Semaphore>,
    spam_timeout: Duration,
    store_timeout: Duration,
}

impl CallScreener {
    /// Create a screener with default deadlines.
    #[must_use]
    pub fn new(rules: RuleRepository, log: DecisionLog, oracle: Arc<dyn SpamOracle>) -> Self {
        Self {
            rules,
            log,
            oracle,
            spam_lookups: Arc::new(Semaphore::new(DEFAULT_SPAM_LOOKUP_LIMIT)),
            spam_timeout: Duration::from_millis(DEFAULT_SPAM_TIMEOUT_MS),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }

    /// Open the rule store, decision log and spam list described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the configured
    /// spam list cannot be loaded.
    pub async fn from_config(config: &ScreeningConfig) -> Result<Self> {
        let db_path = config.database_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db_path = db_path.to_string_lossy();

        let rules = RuleRepository::new(&db_path).await?;
        let log = DecisionLog::new(&db_path).await?;
        let oracle = match &config.spam_list_path {
            Some(path) => SpamList::from_json_file(path)?,
            None => SpamList::builtin(),
        };

        Ok(Self::new(rules, log, Arc::new(oracle))
            .with_spam_timeout(config.spam_timeout())
            .with_store_timeout(config.store_timeout()))
    }

    /// Set how long the spam oracle may take.
    ///
    /// A lookup that misses the deadline is abandoned, not cancelled: its
    /// blocking thread runs until the oracle returns and keeps holding one
    /// lookup slot (see [`with_spam_lookup_limit`](Self::with_spam_lookup_limit)).
    #[must_use]
    pub const fn with_spam_timeout(mut self, deadline: Duration) -> Self {
        self.spam_timeout = deadline;
        self
    }

    /// Set how many spam lookups may be in flight at once.
    ///
    /// When every slot is taken, further calls skip the oracle and are
    /// treated as not spam. A limit of zero is raised to one.
    #[must_use]
    pub fn with_spam_lookup_limit(mut self, limit: usize) -> Self {
        self.spam_lookups = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Set how long reading the rules or recording a block may take.
    #[must_use]
    pub const fn with_store_timeout(mut self, deadline: Duration) -> Self {
        self.store_timeout = deadline;
        self
    }

    /// The rule store this screener reads.
    #[must_use]
    pub const fn rules(&self) -> &RuleRepository {
        &self.rules
    }

    /// The decision log this screener writes.
    #[must_use]
    pub const fn log(&self) -> &DecisionLog {
        &self.log
    }

    /// Screen one call and decide how the call source must respond.
    ///
    /// Calls without an extractable number pass through untouched and leave
    /// no log entry. Blocked calls are appended to the decision log.
    pub async fn screen(&self, call: &IncomingCall) -> CallResponse {
        let Some(number) = call.number() else {
            debug!(handle = ?call.handle, "No number on call, passing through");
            return CallResponse::allow();
        };

        let decision = self.evaluate(&number).await;
        if !decision.should_block {
            debug!(%number, "Call allowed");
            return CallResponse::allow();
        }

        let reason = decision.reason.map_or(UNKNOWN_REASON, |r| r.as_str());
        info!(%number, reason, "Call blocked");

        match timeout(self.store_timeout, self.log.append(&number, reason)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(%number, "Failed to record blocked call: {e}"),
            Err(_) => warn!(
                %number,
                timeout = ?self.store_timeout,
                "Recording blocked call timed out"
            ),
        }

        CallResponse::block()
    }

    /// Decide on a number without enforcing or logging anything.
    ///
    /// Fails open: if the rules cannot be read or the oracle does not answer
    /// in time, the number is allowed.
    pub async fn evaluate(&self, number: &str) -> BlockDecision {
        let rules = match timeout(self.store_timeout, self.rules.snapshot()).await {
            Ok(Ok(rules)) => rules,
            Ok(Err(e)) => {
                warn!(number, "Rule store unavailable, allowing call: {e}");
                return BlockDecision::allow();
            }
            Err(_) => {
                warn!(
                    number,
                    timeout = ?self.store_timeout,
                    "Rule store timed out, allowing call"
                );
                return BlockDecision::allow();
            }
        };

        let normalized = normalize(number);
        if let Some(reason) = match_rules(&normalized, &rules) {
            return BlockDecision::block(reason);
        }

        if self.is_spam(normalized).await {
            BlockDecision::block(BlockReason::Spam)
        } else {
            BlockDecision::allow()
        }
    }

    /// Ask the oracle off the async runtime, bounded by the spam deadline.
    async fn is_spam(&self, normalized: String) -> bool {
        let Ok(permit) = Arc::clone(&self.spam_lookups).try_acquire_owned() else {
            warn!("Too many spam lookups in flight, treating as not spam");
            return false;
        };

        let oracle = Arc::clone(&self.oracle);
        let lookup = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            oracle.is_spam(&normalized)
        });

        match timeout(self.spam_timeout, lookup).await {
            Ok(Ok(spam)) => spam,
            Ok(Err(e)) => {
                warn!("Spam oracle failed, treating as not spam: {e}");
                false
            }
            Err(_) => {
                warn!(
                    timeout = ?self.spam_timeout,
                    "Spam oracle timed out, treating as not spam"
                );
                false
            }
        }
    }
}
