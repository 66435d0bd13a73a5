//! CLI command implementations

pub mod configure;
pub mod init;
pub mod leaderboard;
pub mod level;
pub mod rank;
pub mod replay;
