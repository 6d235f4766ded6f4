pub const BPS_DENOMINATOR: u128 = 10_000u128;
pub const MAX_FEE_BPS: u32 = 1_000; // 10%
pub const MAX_UTILIZATION_BPS: u32 = 10_000;
pub const MAX_SUPPORTED_ASSETS: u32 = 50;
pub const SECONDS_PER_DAY: u64 = 86_400;
pub const EMERGENCY_WITHDRAWAL_DELAY: u64 = 3 * SECONDS_PER_DAY;
pub const DEFAULT_COOLDOWN_LEDGERS: u32 = 1;
pub const DEFAULT_ANOMALY_THRESHOLD: u32 = 10;
pub const TTL_THRESHOLD: u32 = 100_000;
pub const TTL_EXTEND_TO: u32 = 200_000;
