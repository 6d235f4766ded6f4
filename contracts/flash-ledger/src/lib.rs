#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod constants;
mod contract;
mod errors;
mod events;
mod guards;
mod helpers;
mod storage;

pub use constants::*;
pub use contract::{FlashLedger, FlashLedgerClient};
pub use errors::Error;
pub use storage::{
    AssetConfig, AssetLedger, BreakerState, PendingWithdrawal, RiskSettings, VolumeWindow,
};
