//! Command handlers

pub mod account;
pub mod book;
pub mod config;
pub mod favorites;
pub mod history;
pub mod profile;
pub mod search;
pub mod status;
