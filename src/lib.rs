#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod contract;
pub mod map;
pub mod random;
pub mod territory;
pub mod types;

#[cfg(test)]
mod testutil;

pub use contract::{
    Contract, GameView, GenerateError, PAYOUT_PER_HOP, Player, PlayerId, StartingDraw,
    generate_market_contract, generate_private_contract, generate_starting_contract, payout,
    tie_reward, value_of_node,
};
pub use map::{EdgeId, GoodId, MapData, MapError, MapLoadError, NodeId, RailMap};
pub use random::weighted_pick;
pub use territory::sim::{SeedSummary, grow_independents, seed_independents};
pub use territory::{LedgerError, Territory, TerritoryId, TerritoryLedger};
pub use types::{ContractKind, Region, Sector};
