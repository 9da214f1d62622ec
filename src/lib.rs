//! Car insurance intake bot: collects a passport and a vehicle document,
//! confirms the extracted data and the price, and issues a policy.

pub mod agent;
pub mod channels;
pub mod config;
pub mod error;
pub mod extraction;
pub mod intake;
pub mod llm;
