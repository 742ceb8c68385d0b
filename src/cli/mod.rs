//! CLI infrastructure for the arena-rl toolkit
//!
//! This module provides the command-line interface for training networks,
//! distilling learned tables into networks, and inspecting saved tables.

pub mod commands;
pub mod config;
pub mod output;
