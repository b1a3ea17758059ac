//! Vaultgen - SQL generation for Data Vault loads
//!
//! This crate turns declarative descriptions of a Data Vault model into SQL:
//! - Hubs, role-playing hubs, links, satellites and effectivity satellites
//! - A staging table computed from an extract, with hashkeys and hashdiffs
//! - Load statements ordered so parents load before children
//!
//! It never connects to a database; its only output is SQL text.

pub mod config;
pub mod data_vault;
pub mod sql_generator;
