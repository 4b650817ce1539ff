//! # Agency Strategist
//!
//! A marketing-strategy backend run by a small agency of LLM roles.
//!
//! This library provides:
//! - An HTTP API that accepts a brand and a goal
//! - A bounded multi-party conversation among nine agency roles
//! - Bilingual web research and content formatting tools for those roles
//! - A classifier that turns the conversation into a six-section strategy
//!
//! ## Architecture
//!
//! 1. Build the roster of roles for the brand and goal
//! 2. Seed the conversation with one structured prompt
//! 3. Let roles take turns (calling tools as needed) until one signs off
//!    with `TERMINATE` or the round cap is reached
//! 4. Classify the transcript into summary, steps, recommendations,
//!    research, media plan and content
//!
//! ## Example
//!
//! ```rust,ignore
//! use agency_strategist::{agency::Agency, config::Config};
//!
//! let config = Config::from_env()?;
//! let agency = Agency::from_config(&config)?;
//! let result = agency.develop_strategy("Acme", "Awareness").await?;
//! ```

pub mod agency;
pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod strategy;
pub mod tools;

pub use config::Config;
