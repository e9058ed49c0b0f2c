//! Data access and review workflow for a short-term rental marketplace.
//!
//! Listings and reviews live in a hosted record store reached through
//! [`gateway::RecordGateway`]. The access layers in [`services`] shape
//! queries and writes for it and normalize stored records into the
//! display models in [`models`].

pub mod config;
pub mod gateway;
pub mod models;
pub mod services;
pub mod workflow;
