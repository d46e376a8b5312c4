//! # Operation Ledger
//!
//! The single source of truth for historical operations and the only place
//! operation numbers are issued.
//!
//! ## Sequencing
//!
//! Every call takes the store's lock, loads the store, and (for writes)
//! commits counter and records in one store write. Ledgers opened on the
//! same file share that lock (see [`FileStore::shared`]), so within a
//! process two callers never see the same number, and a failed commit
//! leaves the counter exactly where it was.
//!
//! ```text
//! append(input)
//!   lock ─► load {counter: n, records} ─► record #n+1 ─► commit {n+1, records+1}
//!                                                         │
//!                                            error ◄──────┘ (nothing changed)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use recibo::ledger::OperationLedger;
//! # fn input() -> recibo::model::OperationInput { unimplemented!() }
//!
//! let ledger = OperationLedger::open("data/operaciones.json")?;
//! let record = ledger.append(input())?;
//! println!("{}", record.operation_number); // 216-000001
//! # Ok::<(), recibo::ReciboError>(())
//! ```

pub mod store;

pub use store::{FileStore, MemoryStore, Snapshot, Store};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ReciboError;
use crate::model::{OperationInput, OperationNumber, ReceiptRecord};

/// Aggregate view over every stored operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub count: usize,
    pub total_amount: Decimal,
    pub last_record: Option<ReceiptRecord>,
}

/// Sequence generator plus append-only record store.
pub struct OperationLedger<S = FileStore> {
    store: Arc<Mutex<S>>,
}

impl OperationLedger<FileStore> {
    /// Open a file-backed ledger, checking that the store is readable.
    ///
    /// Every ledger opened on the same file in this process shares one store
    /// handle and therefore one sequence.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReciboError> {
        let ledger = Self {
            store: FileStore::shared(path),
        };
        {
            let store = ledger.lock()?;
            let snapshot = store.load()?;
            tracing::info!(
                path = %store.path().display(),
                records = snapshot.records.len(),
                counter = snapshot.counter,
                "Opened ledger"
            );
        }
        Ok(ledger)
    }
}

impl<S: Store> OperationLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>, ReciboError> {
        self.store
            .lock()
            .map_err(|_| ReciboError::Persistence("Ledger lock poisoned".to_string()))
    }

    /// Reserve the next operation number, persisting the advanced counter.
    ///
    /// The number is consumed even if no record is ever stored under it.
    pub fn next_operation_number(&self) -> Result<OperationNumber, ReciboError> {
        let mut store = self.lock()?;
        let mut snapshot = store.load()?;
        let number = OperationNumber::new(snapshot.counter + 1);
        snapshot.counter = number.sequence();
        store.commit(&snapshot)?;
        Ok(number)
    }

    /// Give `input` an identity and store it.
    ///
    /// Counter and record are committed together; on error neither moved.
    pub fn append(&self, input: OperationInput) -> Result<ReceiptRecord, ReciboError> {
        let mut store = self.lock()?;
        let mut snapshot = store.load()?;

        let record = ReceiptRecord {
            id: Uuid::new_v4(),
            operation_number: OperationNumber::new(snapshot.counter + 1),
            created_at: Local::now().fixed_offset(),
            details: input,
        };
        snapshot.counter = record.operation_number.sequence();
        snapshot.records.push(record.clone());

        store.commit(&snapshot)?;

        tracing::info!(
            operation_number = %record.operation_number,
            operation_type = ?record.details.operation_type,
            amount = %record.details.amount,
            "Operation appended"
        );
        Ok(record)
    }

    /// Every record in insertion order.
    pub fn all(&self) -> Result<Vec<ReceiptRecord>, ReciboError> {
        Ok(self.lock()?.load()?.records)
    }

    /// Every record, most recent first.
    pub fn recent_first(&self) -> Result<Vec<ReceiptRecord>, ReciboError> {
        let mut records = self.all()?;
        records.reverse();
        Ok(records)
    }

    pub fn by_id(&self, id: Uuid) -> Result<Option<ReceiptRecord>, ReciboError> {
        Ok(self.all()?.into_iter().find(|r| r.id == id))
    }

    pub fn by_number(
        &self,
        number: OperationNumber,
    ) -> Result<Option<ReceiptRecord>, ReciboError> {
        Ok(self
            .all()?
            .into_iter()
            .find(|r| r.operation_number == number))
    }

    /// Count, amount total and newest record, recomputed on every call.
    pub fn stats(&self) -> Result<LedgerStats, ReciboError> {
        let mut records = self.all()?;
        Ok(LedgerStats {
            count: records.len(),
            total_amount: records.iter().map(|r| r.details.amount).sum(),
            last_record: records.pop(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
