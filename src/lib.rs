//! Client core for the world boss game: contract access, response
//! normalization, error classification and damage leaderboards.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use config::{Config, ContractAddresses, Deployment};
pub use error::{AppError, Result};
pub use services::{ChainGateway, RankingAggregator};
pub use session::{MemorySessionStorage, SessionContext, SessionStorage};
