//! Moda Brasil Core - Shared domain types.
//!
//! This crate provides the types shared by every Moda Brasil component:
//! - `storefront` - JSON API for customers, partners and admins
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Everything here can be unit tested without a
//! runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, emails, money and status enums
//! - [`affiliate`] - Affiliate codes, commission rate and share links
//! - [`referral`] - Referral-code extraction from page URLs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod affiliate;
pub mod referral;
pub mod types;

pub use affiliate::{AFFILIATE_COMMISSION_PERCENT, AffiliateCode};
pub use referral::ReferralLocation;
pub use types::*;
