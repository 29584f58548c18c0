//! Core types and definitions for the BASTION combat simulation.
//!
//! This crate defines the vocabulary shared by the simulation and its
//! tooling: components, configuration records, commands, snapshots,
//! events, constants, and the error taxonomy. It has no dependency on
//! the ECS runtime or on any presentation layer.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod path;
pub mod state;
pub mod types;
