//! # ridematch-types
//!
//! Shared types, errors, and configuration for the **RideMatch** engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OfferId`], [`RequestId`], [`UserId`], [`DriverKey`], [`RiderKey`], [`NodeRef`]
//! - **Locations**: [`Location`], [`LocationIndex`]
//! - **Ride payloads**: [`RideOffer`], [`RideRequest`], [`MatchNode`], [`NodeRole`]
//! - **Travel data**: [`TravelLeg`]
//! - **Configuration**: [`EngineConfig`], [`ExtensionMode`]
//! - **Errors**: [`RidematchError`] with `RM_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod location;
pub mod node;
pub mod travel;

// Re-export all primary types at crate root for ergonomic imports:
//   use ridematch_types::{Location, RideOffer, TravelLeg, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use location::*;
pub use node::*;
pub use travel::*;

// Constants are accessed via `ridematch_types::constants::FOO`
// (not re-exported to avoid name collisions).
