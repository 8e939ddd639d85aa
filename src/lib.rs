//! A multi-entrant car race: cars from a registry race on randomized
//! completion times, the fastest car wins, and every result is merged
//! into a persistent leaderboard.

pub mod command;
pub mod config;
pub mod constants;
pub mod controller;
pub mod database;
pub mod event;
