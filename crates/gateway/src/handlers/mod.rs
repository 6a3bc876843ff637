//! API handlers module

pub mod acknowledgment;
pub mod download;
pub mod health;
pub mod misc;
pub mod upload;
