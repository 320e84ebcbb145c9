//! Exclusive launcher identity activation.
//!
//! # Responsibility
//! - Resolve a requested identity name to exactly one catalogue entry.
//! - Sweep the component registry so that only the resolved identity stays
//!   launchable.
//! - Offer a startup self-heal pass for half-finished sweeps.
//!
//! # Invariants
//! - Resolution is total: absent, empty and unknown names resolve to
//!   `default` before any registry command is issued.
//! - Sweeps within one process never interleave.
//! - Registry failures halt the sweep and are reported, never retried or
//!   rolled back.
//!
//! # Residual risk
//! A process killed between the disable sweep and the final enable leaves
//! every identity disabled. Nothing journals in-flight sweeps; the next
//! `activate` or `self_heal` call is the recovery path.

pub mod manager;
pub mod outcome;
pub mod resolve;
