use soroban_sdk::{contracttype, Address, Env};

use crate::constants::*;
use crate::errors::Error;

// Storage key types for the contract
#[contracttype]
pub enum DataKey {
    Admin,                        // Address
    Executor,                     // Address of the settlement contract
    Initialized,                  // bool flag to prevent re-initialization
    Paused,                       // bool
    Settings,                     // RiskSettings
    Breaker,                      // BreakerState
    SupportedAssetCount,          // u32, bounded by MAX_SUPPORTED_ASSETS
    AssetConfig(Address),         // AssetConfig per token
    AssetLedger(Address),         // AssetLedger per token
    LastLoanLedger(Address),      // u32 ledger sequence per borrower
    EmergencyWithdrawal(Address), // PendingWithdrawal per token
}

// Lives only for the duration of a loan; never persisted across calls.
#[contracttype]
pub enum TempKey {
    LoanInFlight,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetConfig {
    pub supported: bool,
    pub max_loan: u128,
    pub fee_bps: u32,
    pub max_daily_volume: u128,
}

impl AssetConfig {
    pub fn unconfigured() -> Self {
        Self {
            supported: false,
            max_loan: 0,
            fee_bps: 0,
            max_daily_volume: 0,
        }
    }
}

/// Rolling daily volume counter; `day` is `timestamp / SECONDS_PER_DAY`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeWindow {
    pub used: u128,
    pub day: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetLedger {
    pub total_principal: u128,
    pub accumulated_fees: u128,
    pub volume: VolumeWindow,
    pub successful_loans: u64,
}

impl AssetLedger {
    pub fn empty() -> Self {
        Self {
            total_principal: 0,
            accumulated_fees: 0,
            volume: VolumeWindow { used: 0, day: 0 },
            successful_loans: 0,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RiskSettings {
    pub cooldown_ledgers: u32,
    pub max_utilization_bps: u32,
    pub anomaly_threshold: u32,
}

impl RiskSettings {
    pub fn defaults() -> Self {
        Self {
            cooldown_ledgers: DEFAULT_COOLDOWN_LEDGERS,
            max_utilization_bps: MAX_UTILIZATION_BPS,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BreakerState {
    pub anomaly_count: u32,
    pub last_reset: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingWithdrawal {
    pub amount: u128,
    pub to: Address,
    pub unlock_time: u64,
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get::<_, bool>(&DataKey::Initialized)
        .unwrap_or(false)
}

pub fn ensure_initialized(env: &Env) -> Result<(), Error> {
    if !is_initialized(env) {
        return Err(Error::NotInitialized);
    }
    bump_core_ttl(env);
    Ok(())
}

pub fn bump_core_ttl(env: &Env) {
    for key in [
        DataKey::Admin,
        DataKey::Executor,
        DataKey::Initialized,
        DataKey::Paused,
        DataKey::Settings,
        DataKey::Breaker,
        DataKey::SupportedAssetCount,
    ] {
        bump_ttl(env, &key);
    }
}

fn bump_ttl(env: &Env, key: &DataKey) {
    let persistent = env.storage().persistent();
    if persistent.has(key) {
        persistent.extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn read_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn write_admin(env: &Env, admin: &Address) {
    env.storage().persistent().set(&DataKey::Admin, admin);
}

pub fn read_executor(env: &Env) -> Result<Address, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Executor)
        .ok_or(Error::NotInitialized)
}

pub fn write_executor(env: &Env, executor: &Address) {
    env.storage().persistent().set(&DataKey::Executor, executor);
}

pub fn read_paused(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn write_paused(env: &Env, paused: bool) {
    env.storage().persistent().set(&DataKey::Paused, &paused);
}

pub fn read_settings(env: &Env) -> Result<RiskSettings, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Settings)
        .ok_or(Error::NotInitialized)
}

pub fn write_settings(env: &Env, settings: &RiskSettings) {
    env.storage().persistent().set(&DataKey::Settings, settings);
}

pub fn read_breaker(env: &Env) -> BreakerState {
    env.storage()
        .persistent()
        .get(&DataKey::Breaker)
        .unwrap_or(BreakerState {
            anomaly_count: 0,
            last_reset: 0,
        })
}

pub fn write_breaker(env: &Env, state: &BreakerState) {
    env.storage().persistent().set(&DataKey::Breaker, state);
}

pub fn read_supported_count(env: &Env) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::SupportedAssetCount)
        .unwrap_or(0u32)
}

pub fn write_supported_count(env: &Env, count: u32) {
    env.storage()
        .persistent()
        .set(&DataKey::SupportedAssetCount, &count);
}

pub fn read_asset_config(env: &Env, token: &Address) -> AssetConfig {
    let key = DataKey::AssetConfig(token.clone());
    bump_ttl(env, &key);
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or(AssetConfig::unconfigured())
}

pub fn write_asset_config(env: &Env, token: &Address, config: &AssetConfig) {
    let key = DataKey::AssetConfig(token.clone());
    env.storage().persistent().set(&key, config);
    bump_ttl(env, &key);
}

pub fn read_asset_ledger(env: &Env, token: &Address) -> AssetLedger {
    let key = DataKey::AssetLedger(token.clone());
    bump_ttl(env, &key);
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or(AssetLedger::empty())
}

pub fn write_asset_ledger(env: &Env, token: &Address, ledger: &AssetLedger) {
    let key = DataKey::AssetLedger(token.clone());
    env.storage().persistent().set(&key, ledger);
    bump_ttl(env, &key);
}

pub fn read_last_loan_ledger(env: &Env, borrower: &Address) -> Option<u32> {
    let key = DataKey::LastLoanLedger(borrower.clone());
    bump_ttl(env, &key);
    env.storage().persistent().get(&key)
}

pub fn write_last_loan_ledger(env: &Env, borrower: &Address, sequence: u32) {
    let key = DataKey::LastLoanLedger(borrower.clone());
    env.storage().persistent().set(&key, &sequence);
    bump_ttl(env, &key);
}

pub fn read_pending_withdrawal(env: &Env, token: &Address) -> Option<PendingWithdrawal> {
    env.storage()
        .persistent()
        .get(&DataKey::EmergencyWithdrawal(token.clone()))
}

pub fn write_pending_withdrawal(env: &Env, token: &Address, pending: &PendingWithdrawal) {
    let key = DataKey::EmergencyWithdrawal(token.clone());
    env.storage().persistent().set(&key, pending);
    bump_ttl(env, &key);
}

pub fn remove_pending_withdrawal(env: &Env, token: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::EmergencyWithdrawal(token.clone()));
}
