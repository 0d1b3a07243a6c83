//! Leave Balance Ledger & Compliance Engine for Japanese statutory annual
//! paid leave (年次有給休暇).
//!
//! This crate computes statutory grant amounts from seniority, tracks
//! multi-tranche balances with a two-year validity window, deducts approved
//! leave against tranches most-recently-granted first, rolls balances across
//! fiscal-year boundaries, and derives compliance status under the mandatory
//! five-day usage rule.

#![warn(missing_docs)]

pub mod clock;
pub mod compliance;
pub mod config;
pub mod error;
pub mod facade;
pub mod ledger;
pub mod models;
