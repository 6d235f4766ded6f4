use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerInitialized {
    #[topic]
    pub admin: Address,
    pub executor: Address,
    pub cooldown_ledgers: u32,
    pub max_utilization_bps: u32,
    pub anomaly_threshold: u32,
}

/// Emitted whenever an asset's configuration is overwritten.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetConfigured {
    #[topic]
    pub token: Address,
    pub supported: bool,
    pub max_loan: u128,
    pub fee_bps: u32,
    pub max_daily_volume: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposited {
    #[topic]
    pub from: Address,
    #[topic]
    pub token: Address,
    pub amount: u128,
    pub total_principal: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawn {
    #[topic]
    pub to: Address,
    #[topic]
    pub token: Address,
    pub amount: u128,
    pub total_principal: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeesSwept {
    #[topic]
    pub token: Address,
    pub to: Address,
    pub amount: u128,
}

/// Untracked balance of an unsupported token moved out of the pool.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenRecovered {
    #[topic]
    pub token: Address,
    pub to: Address,
    pub amount: u128,
}

/// Emitted once a flash loan has been repaid and committed.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlashLoan {
    #[topic]
    pub receiver: Address,
    #[topic]
    pub token: Address,
    pub initiator: Address,
    pub amount: u128,
    pub fee: u128,
}

/// A loan failed after disbursement and was rolled back; `reason` is the `Error` code.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoanAborted {
    #[topic]
    pub receiver: Address,
    #[topic]
    pub token: Address,
    pub initiator: Address,
    pub amount: u128,
    pub reason: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnomalyRecorded {
    pub anomaly_count: u32,
    pub threshold: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CircuitBreakerReset {
    pub cleared: u32,
    pub timestamp: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CooldownUpdated {
    pub cooldown_ledgers: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UtilizationCeilingUpdated {
    pub max_utilization_bps: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnomalyThresholdUpdated {
    pub anomaly_threshold: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PauseUpdated {
    pub paused: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawalInitiated {
    #[topic]
    pub token: Address,
    pub to: Address,
    pub amount: u128,
    pub unlock_time: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawalExecuted {
    #[topic]
    pub token: Address,
    pub to: Address,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawalCancelled {
    #[topic]
    pub token: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewAdmin {
    pub old_admin: Address,
    pub new_admin: Address,
}
