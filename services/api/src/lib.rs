//! WitWar API service
//!
//! A social voting service: users post jokes, friend each other, and vote
//! once per day for a favorite comedian. This crate owns the whole
//! friend-and-voting workflow against PostgreSQL and exposes it over HTTP.

pub mod cooldown;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
