//! # Sprig - A CLI sprint assistant
//!
//! Sprig helps an agile team run its sprint ceremonies from the terminal. It
//! keeps sprints and their stories as TOML files and uses a generative model
//! to summarize standups, estimate stories and draft plans.
//!
//! ## Features
//!
//! - **Standups**: collect member updates, summarize them and flag blockers
//! - **Planning**: compare team estimates with the model's, draft and approve
//!   the sprint plan
//! - **Retrospectives**: gather feedback and sentiment, summarize and record
//!   action items
//! - **Completion guards**: once a session's terminal action has happened it
//!   can no longer be changed or reset
//!
//! ## Quick Start
//!
//! ```bash
//! # Initialize a project
//! sprig init --team "Alpha Team" --session AlphaTeam_Sprint_3
//!
//! # Create a sprint and add a story
//! sprig sprint create 3 -g "Ship login"
//! sprig story add "Login form" -p high
//!
//! # Run the sessions
//! sprig shell
//! ```
//!
//! ## Modules
//!
//! - [`assistant`]: The session operations wired to storage, generation and notification
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Configuration loading and management
//! - [`error`]: Error types and result aliases
//! - [`estimate`]: Story point scale and estimate extraction
//! - [`generation`]: Text generation client and retry policy
//! - [`model`]: Data models (Sprint, Story, session records)
//! - [`notify`]: Team notifications
//! - [`session`]: Session state and completion guards
//! - [`storage`]: File-based sprint storage
//! - [`validation`]: Input validation utilities

pub mod assistant;

/// Command-line interface definitions using clap.
pub mod cli;

/// Configuration loading and management.
///
/// Handles `.sprig.toml` configuration files and project discovery.
pub mod config;

/// Error types and result aliases.
///
/// Defines `SprigError` enum and `Result<T>` type alias.
pub mod error;

pub mod estimate;

/// Text generation.
///
/// A [`generation::TextGenerator`] trait with a Gemini implementation and a
/// bounded retry on rate limiting.
pub mod generation;

mod http;
pub mod logging;

/// Data models for sprig.
pub mod model;

pub mod notify;

/// Standup, planning and retrospective session state.
pub mod session;

/// File-based storage layer.
///
/// Reads and writes sprints as TOML files.
pub mod storage;

/// Input validation utilities.
///
/// Validates titles, bodies, names, ids and scores to prevent invalid data.
pub mod validation;
