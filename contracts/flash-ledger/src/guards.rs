//! Pure risk checks applied to every loan request.
//!
//! Each check returns a [`Rejection`] carrying the values that caused it; the
//! contract entrypoints turn that into an [`Error`] code after logging them.

use crate::constants::*;
use crate::errors::Error;
use crate::storage::{AssetConfig, BreakerState, RiskSettings, VolumeWindow};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    Paused,
    CircuitOpen {
        anomaly_count: u32,
        threshold: u32,
    },
    Reentrant,
    ZeroAmount,
    Cooldown {
        last_ledger: u32,
        cooldown: u32,
        current: u32,
    },
    InsufficientLiquidity {
        requested: u128,
        available: u128,
    },
    Unsupported,
    MaxLoanExceeded {
        requested: u128,
        max: u128,
    },
    UtilizationExceeded {
        utilization_bps: u128,
        max_bps: u32,
    },
    DailyLimitExceeded {
        used: u128,
        requested: u128,
        limit: u128,
    },
    ExceedsPrincipal {
        requested: u128,
        principal: u128,
    },
    FeesUndercovered {
        remaining: u128,
        fees: u128,
    },
    Overflow,
}

impl Rejection {
    pub fn error(&self) -> Error {
        match self {
            Rejection::Paused => Error::Paused,
            Rejection::CircuitOpen { .. } => Error::CircuitBreakerOpen,
            Rejection::Reentrant => Error::Reentrancy,
            Rejection::ZeroAmount => Error::InvalidAmount,
            Rejection::Cooldown { .. } => Error::CooldownActive,
            Rejection::InsufficientLiquidity { .. } => Error::InsufficientLiquidity,
            Rejection::Unsupported => Error::UnsupportedAsset,
            Rejection::MaxLoanExceeded { .. } => Error::MaxLoanExceeded,
            Rejection::UtilizationExceeded { .. } => Error::UtilizationExceeded,
            Rejection::DailyLimitExceeded { .. } => Error::DailyLimitExceeded,
            Rejection::ExceedsPrincipal { .. } => Error::ExceedsPrincipal,
            Rejection::FeesUndercovered { .. } => Error::FeesUndercovered,
            Rejection::Overflow => Error::ArithmeticOverflow,
        }
    }
}

pub fn validate_settings(settings: &RiskSettings) -> Result<(), Error> {
    if settings.cooldown_ledgers == 0
        || settings.max_utilization_bps == 0
        || settings.max_utilization_bps > MAX_UTILIZATION_BPS
        || settings.anomaly_threshold == 0
    {
        return Err(Error::InvalidSettings);
    }
    Ok(())
}

pub fn check_breaker(state: &BreakerState, threshold: u32) -> Result<(), Rejection> {
    if state.is_open(threshold) {
        return Err(Rejection::CircuitOpen {
            anomaly_count: state.anomaly_count,
            threshold,
        });
    }
    Ok(())
}

pub fn check_amount(amount: u128) -> Result<(), Rejection> {
    if amount == 0 {
        return Err(Rejection::ZeroAmount);
    }
    Ok(())
}

/// A borrower that never borrowed is always eligible.
pub fn check_cooldown(last: Option<u32>, cooldown: u32, current: u32) -> Result<(), Rejection> {
    let Some(last_ledger) = last else {
        return Ok(());
    };
    let ready_at = last_ledger.checked_add(cooldown).ok_or(Rejection::Overflow)?;
    if current < ready_at {
        return Err(Rejection::Cooldown {
            last_ledger,
            cooldown,
            current,
        });
    }
    Ok(())
}

pub fn check_liquidity(amount: u128, available: u128) -> Result<(), Rejection> {
    if amount > available {
        return Err(Rejection::InsufficientLiquidity {
            requested: amount,
            available,
        });
    }
    Ok(())
}

pub fn check_asset(config: &AssetConfig, amount: u128) -> Result<(), Rejection> {
    if !config.supported {
        return Err(Rejection::Unsupported);
    }
    if amount > config.max_loan {
        return Err(Rejection::MaxLoanExceeded {
            requested: amount,
            max: config.max_loan,
        });
    }
    Ok(())
}

/// Share of `available` drawn by `amount`, in basis points.
pub fn utilization_bps(amount: u128, available: u128) -> Result<u128, Rejection> {
    if available == 0 {
        return Err(Rejection::InsufficientLiquidity {
            requested: amount,
            available,
        });
    }
    let scaled = amount
        .checked_mul(BPS_DENOMINATOR)
        .ok_or(Rejection::Overflow)?;
    Ok(scaled / available)
}

pub fn check_utilization(amount: u128, available: u128, max_bps: u32) -> Result<(), Rejection> {
    let utilization = utilization_bps(amount, available)?;
    if utilization > max_bps as u128 {
        return Err(Rejection::UtilizationExceeded {
            utilization_bps: utilization,
            max_bps,
        });
    }
    Ok(())
}

/// floor(amount * fee_bps / 10_000)
pub fn quote_fee(amount: u128, fee_bps: u32) -> Result<u128, Rejection> {
    let scaled = amount
        .checked_mul(fee_bps as u128)
        .ok_or(Rejection::Overflow)?;
    Ok(scaled / BPS_DENOMINATOR)
}

/// Largest loan the pool can quote: free balance after reserving fees, capped by config.
pub fn max_loan_for(config: &AssetConfig, balance: u128, accumulated_fees: u128) -> u128 {
    if !config.supported {
        return 0;
    }
    let free = balance.saturating_sub(accumulated_fees);
    if free < config.max_loan {
        free
    } else {
        config.max_loan
    }
}

/// Principal withdrawals may neither exceed committed principal nor dip into fees.
pub fn check_withdrawal(
    amount: u128,
    principal: u128,
    balance: u128,
    accumulated_fees: u128,
) -> Result<(), Rejection> {
    if amount > principal {
        return Err(Rejection::ExceedsPrincipal {
            requested: amount,
            principal,
        });
    }
    let remaining = balance
        .checked_sub(amount)
        .ok_or(Rejection::InsufficientLiquidity {
            requested: amount,
            available: balance,
        })?;
    if remaining < accumulated_fees {
        return Err(Rejection::FeesUndercovered {
            remaining,
            fees: accumulated_fees,
        });
    }
    Ok(())
}

impl VolumeWindow {
    /// Volume used so far on `today`; a later day starts from zero.
    pub fn used_on(&self, today: u64) -> u128 {
        if today > self.day {
            0
        } else {
            self.used
        }
    }

    /// The window after drawing `amount`, or the reason it cannot be drawn.
    /// The receiver is left untouched so a rejected loan changes nothing.
    pub fn reserve(&self, today: u64, amount: u128, limit: u128) -> Result<VolumeWindow, Rejection> {
        let used = self.used_on(today);
        let next = used.checked_add(amount).ok_or(Rejection::Overflow)?;
        if next > limit {
            return Err(Rejection::DailyLimitExceeded {
                used,
                requested: amount,
                limit,
            });
        }
        Ok(VolumeWindow {
            used: next,
            day: if today > self.day { today } else { self.day },
        })
    }
}

impl BreakerState {
    pub fn is_open(&self, threshold: u32) -> bool {
        self.anomaly_count >= threshold
    }

    pub fn record_anomaly(&self) -> Result<BreakerState, Rejection> {
        Ok(BreakerState {
            anomaly_count: self
                .anomaly_count
                .checked_add(1)
                .ok_or(Rejection::Overflow)?,
            last_reset: self.last_reset,
        })
    }
}
