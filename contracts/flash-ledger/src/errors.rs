use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Configuration
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidAddress = 4,
    FeeTooHigh = 5,
    AssetLimitReached = 6,
    InvalidSettings = 7,
    InvalidAmount = 8,
    // Eligibility and liquidity
    Paused = 10,
    Reentrancy = 11,
    CircuitBreakerOpen = 12,
    CooldownActive = 13,
    InsufficientLiquidity = 14,
    UnsupportedAsset = 15,
    MaxLoanExceeded = 16,
    UtilizationExceeded = 17,
    DailyLimitExceeded = 18,
    // Callback and repayment
    CallbackFailed = 20,
    BadAcknowledgement = 21,
    RepaymentNotMet = 22,
    // Accounting
    ExceedsPrincipal = 30,
    FeesUndercovered = 31,
    SupportedAssetRecovery = 32,
    NoPendingWithdrawal = 33,
    WithdrawalLocked = 34,
    // Arithmetic
    ArithmeticOverflow = 40,
    InvalidBalance = 41,
}
