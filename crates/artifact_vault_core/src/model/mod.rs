//! Vault domain model.
//!
//! # Responsibility
//! - Define the record shape persisted in a vault snapshot.
//! - Provide the fingerprints used for duplicate flagging.
//!
//! # Invariants
//! - Artifacts and containers share one id space.
//! - Records are never deleted; lifecycle is expressed through `state`.

pub mod hash;
pub mod record;
