// fieldscrub/src/lib.rs
//! # fieldscrub CLI Application
//!
//! This crate provides the command-line front end for `fieldscrub-core`:
//! argument parsing, config resolution, file and stdin/stdout plumbing and
//! the run summary printed to stderr.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
