pub mod cli;
pub mod config;
pub mod content;
pub mod customers;
pub mod error;
pub mod garden;
pub mod genetics;
pub mod persistence;
pub mod progression;
pub mod simulation;
