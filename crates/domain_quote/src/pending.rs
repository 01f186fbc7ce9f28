//! Pending quotes
//!
//! A quote becomes pending when the wizard's KYC step is submitted and stays
//! pending until it is paid for or deleted. All pending quotes of a user
//! are stored as one JSON list under [`PENDING_QUOTES_KEY`], the shape the
//! dashboard reads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use core_kernel::{read_json, write_json, FormValues, KeyValueStore, Money, QuoteId};

use crate::error::QuoteError;
use crate::premium::PremiumBreakdown;
use crate::quote::{InsuranceType, QuoteDetails, QuoteStatus};

/// Store key of the pending-quote list
pub const PENDING_QUOTES_KEY: &str = "pendingQuotes";

/// A quote awaiting payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQuote {
    pub id: QuoteId,
    pub title: String,
    #[serde(rename = "type")]
    pub insurance_type: InsuranceType,
    pub status: QuoteStatus,
    pub created_date: DateTime<Utc>,
    /// The raw wizard values the quote was built from
    pub quote_details: FormValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<PremiumBreakdown>,
}

impl PendingQuote {
    /// Parses the stored form values into typed details
    pub fn details(&self) -> Result<QuoteDetails, QuoteError> {
        QuoteDetails::from_values(self.insurance_type, &self.quote_details)
    }

    /// The amount to charge, rounded for payment
    pub fn amount_due(&self) -> Option<Money> {
        self.premium.map(|p| p.total_payable.round_to_currency())
    }
}

/// Write locks for pending-quote lists, one per store scope
///
/// Repositories built for the same scope share one lock, so concurrent
/// requests of one user cannot overwrite each other's changes.
#[derive(Debug, Default, Clone)]
pub struct PendingWriteLocks {
    scopes: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl PendingWriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock of `scope`, created on first use
    pub fn for_scope(&self, scope: &str) -> Arc<Mutex<()>> {
        let mut scopes = self
            .scopes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        scopes.entry(scope.to_string()).or_default().clone()
    }
}

/// CRUD over the pending-quote list in a key-value store
///
/// Each change is a read-modify-write of the whole list, serialized by a
/// write lock. Clones share the lock; separate repositories over the same
/// store must be built with [`PendingQuoteRepository::with_write_lock`].
#[derive(Clone)]
pub struct PendingQuoteRepository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl PendingQuoteRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_write_lock(store, Arc::new(Mutex::new(())))
    }

    /// A repository whose changes are serialized by `write_lock`
    pub fn with_write_lock(store: Arc<dyn KeyValueStore>, write_lock: Arc<Mutex<()>>) -> Self {
        Self { store, write_lock }
    }

    /// All pending quotes, oldest first; a malformed list reads as empty
    pub async fn list(&self) -> Result<Vec<PendingQuote>, QuoteError> {
        Ok(read_json(self.store.as_ref(), PENDING_QUOTES_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn get(&self, id: QuoteId) -> Result<Option<PendingQuote>, QuoteError> {
        Ok(self.list().await?.into_iter().find(|q| q.id == id))
    }

    /// Like `get`, but a missing quote is an error
    pub async fn require(&self, id: QuoteId) -> Result<PendingQuote, QuoteError> {
        self.get(id).await?.ok_or(QuoteError::QuoteNotFound(id))
    }

    /// Appends a new quote
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::DuplicateQuote` if the id is already present
    pub async fn insert(&self, quote: PendingQuote) -> Result<(), QuoteError> {
        let _guard = self.write_lock.lock().await;
        let mut quotes = self.list().await?;
        if quotes.iter().any(|q| q.id == quote.id) {
            return Err(QuoteError::DuplicateQuote(quote.id));
        }
        let id = quote.id;
        quotes.push(quote);
        self.save(&quotes).await?;
        info!(quote_id = %id, "Pending quote added");
        Ok(())
    }

    /// Replaces the quote with the same id in place, or appends it
    ///
    /// Returns true if an existing quote was replaced.
    pub async fn upsert(&self, quote: PendingQuote) -> Result<bool, QuoteError> {
        let _guard = self.write_lock.lock().await;
        let mut quotes = self.list().await?;
        let id = quote.id;
        let replaced = match quotes.iter_mut().find(|q| q.id == id) {
            Some(existing) => {
                *existing = quote;
                true
            }
            None => {
                quotes.push(quote);
                false
            }
        };
        self.save(&quotes).await?;
        info!(quote_id = %id, replaced, "Pending quote saved");
        Ok(replaced)
    }

    /// Deletes the quote with the given id; returns whether one was removed
    pub async fn remove(&self, id: QuoteId) -> Result<bool, QuoteError> {
        let _guard = self.write_lock.lock().await;
        let mut quotes = self.list().await?;
        let before = quotes.len();
        quotes.retain(|q| q.id != id);
        if quotes.len() == before {
            debug!(quote_id = %id, "No pending quote to remove");
            return Ok(false);
        }
        self.save(&quotes).await?;
        info!(quote_id = %id, "Pending quote removed");
        Ok(true)
    }

    async fn save(&self, quotes: &[PendingQuote]) -> Result<(), QuoteError> {
        write_json(self.store.as_ref(), PENDING_QUOTES_KEY, quotes).await?;
        Ok(())
    }
}

impl std::fmt::Debug for PendingQuoteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingQuoteRepository").finish_non_exhaustive()
    }
}
