//! Trellis - feature dependency graphs for living documentation.
//!
//! Features declare the code signatures that form their entry points.
//! Instrumentation records which signatures invoke which, per product and
//! version. Trellis resolves that signature-level call graph down to a
//! feature-level graph: which features depend on which, which features are
//! roots, and the expanded graph around any single feature.
//!
//! The crate provides both the `trellis` CLI and a library. Library users
//! usually start from [`service::DependencyService`].

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod catalog;
pub mod domain;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod service;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

pub mod app;
pub mod output;
