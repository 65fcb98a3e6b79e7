#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(warnings))]

//! # bundl-entities
//!
//! Reusable, agnostic domain entities for the Bundl geo subscriptions.
//!
//! The entities only contain generic functionality that does not reveal any application-specific business logic.

pub mod geo;
pub mod geohash;
pub mod location;
pub mod subscription;
pub mod time;
pub mod topic;
