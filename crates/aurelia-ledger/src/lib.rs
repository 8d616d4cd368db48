//! Aurelia Media Ledger
//!
//! A durable, queryable record of every upload ever persisted, independent
//! of the product catalog's own state. The ledger exists so broken
//! product↔media links can be reconciled by hand: the blob store is the
//! source of truth for existence, the ledger is the recovery aid.
//!
//! The backing format is a single JSON document (see
//! `aurelia_core::models::MediaLedgerDocument`); every mutation rewrites the
//! whole document. Mutations serialize behind a write lock and land via an
//! atomic rename, so concurrent appends cannot drop each other's entries and
//! readers never observe a torn file.

pub mod csv;
pub mod ledger;

pub use csv::export_csv;
pub use ledger::{LedgerError, LedgerResult, MediaLedger, RemoveOutcome, RemoveSelector};
