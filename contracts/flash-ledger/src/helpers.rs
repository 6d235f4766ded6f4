use soroban_sdk::{log, token, Address, Bytes, Env, IntoVal, InvokeError, Symbol, Val, Vec};

use crate::constants::SECONDS_PER_DAY;
use crate::errors::Error;
use crate::guards::Rejection;
use crate::storage::{read_admin, read_executor, TempKey};

/// Log the values a check rejected on and hand back its error code.
pub fn reject(env: &Env, rejection: Rejection) -> Error {
    match &rejection {
        Rejection::CircuitOpen {
            anomaly_count,
            threshold,
        } => log!(env, "circuit breaker open: anomalies, threshold", *anomaly_count, *threshold),
        Rejection::Cooldown {
            last_ledger,
            cooldown,
            current,
        } => log!(
            env,
            "cooldown active: last, cooldown, current",
            *last_ledger,
            *cooldown,
            *current
        ),
        Rejection::InsufficientLiquidity {
            requested,
            available,
        } => log!(env, "insufficient liquidity: requested, available", *requested, *available),
        Rejection::MaxLoanExceeded { requested, max } => {
            log!(env, "max loan exceeded: requested, max", *requested, *max)
        }
        Rejection::UtilizationExceeded {
            utilization_bps,
            max_bps,
        } => log!(env, "utilization exceeded: bps, max", *utilization_bps, *max_bps),
        Rejection::DailyLimitExceeded {
            used,
            requested,
            limit,
        } => log!(
            env,
            "daily limit exceeded: used, requested, limit",
            *used,
            *requested,
            *limit
        ),
        Rejection::ExceedsPrincipal {
            requested,
            principal,
        } => log!(env, "exceeds principal: requested, principal", *requested, *principal),
        Rejection::FeesUndercovered { remaining, fees } => {
            log!(env, "fees undercovered: remaining, fees", *remaining, *fees)
        }
        Rejection::Paused
        | Rejection::Reentrant
        | Rejection::ZeroAmount
        | Rejection::Unsupported
        | Rejection::Overflow => {}
    }
    rejection.error()
}

pub fn enforce<T>(env: &Env, outcome: Result<T, Rejection>) -> Result<T, Error> {
    outcome.map_err(|rejection| reject(env, rejection))
}

pub fn require_admin(env: &Env, admin: &Address) -> Result<(), Error> {
    let stored = read_admin(env)?;
    if stored != *admin {
        return Err(Error::Unauthorized);
    }
    admin.require_auth();
    Ok(())
}

pub fn to_i128(amount: u128) -> Result<i128, Error> {
    i128::try_from(amount).map_err(|_| Error::ArithmeticOverflow)
}

pub fn pool_balance(env: &Env, token: &Address) -> Result<u128, Error> {
    let balance = token::Client::new(env, token).balance(&env.current_contract_address());
    u128::try_from(balance).map_err(|_| Error::InvalidBalance)
}

pub fn current_day(env: &Env) -> u64 {
    env.ledger().timestamp() / SECONDS_PER_DAY
}

/// Addresses that can never be a managed asset: the ledger itself and its executor.
pub fn is_reserved_address(env: &Env, token: &Address) -> Result<bool, Error> {
    Ok(*token == env.current_contract_address() || *token == read_executor(env)?)
}

/// In-flight loan marker held in temporary storage; released when dropped.
pub struct LoanLock<'a> {
    env: &'a Env,
}

impl<'a> LoanLock<'a> {
    pub fn acquire(env: &'a Env) -> Result<Self, Rejection> {
        let temporary = env.storage().temporary();
        if temporary.has(&TempKey::LoanInFlight) {
            return Err(Rejection::Reentrant);
        }
        temporary.set(&TempKey::LoanInFlight, &true);
        Ok(Self { env })
    }
}

impl Drop for LoanLock<'_> {
    fn drop(&mut self) {
        self.env.storage().temporary().remove(&TempKey::LoanInFlight);
    }
}

pub struct LoanTerms {
    pub initiator: Address,
    pub receiver: Address,
    pub token: Address,
    pub amount: u128,
    pub fee: u128,
    pub required_balance: u128,
    pub data: Bytes,
}

/// Maps a `LoanExecutor` error code onto the ledger's error space.
pub fn settlement_error(code: u32) -> Error {
    match code {
        2 => Error::BadAcknowledgement,
        3 => Error::RepaymentNotMet,
        _ => Error::CallbackFailed,
    }
}

/// Disburse, call back and verify repayment inside the executor's frame.
///
/// On `Err` the executor frame has already been rolled back, so the pool
/// balance is exactly what it was before the call.
pub fn settle(env: &Env, executor: &Address, terms: &LoanTerms) -> Result<(), Error> {
    let pool = env.current_contract_address();
    let token_client = token::Client::new(env, &terms.token);
    let expiration = env.ledger().sequence();
    token_client.approve(&pool, executor, &to_i128(terms.amount)?, &expiration);

    let args: Vec<Val> = (
        pool.clone(),
        terms.initiator.clone(),
        terms.receiver.clone(),
        terms.token.clone(),
        terms.amount,
        terms.fee,
        terms.required_balance,
        terms.data.clone(),
    )
        .into_val(env);
    let outcome =
        env.try_invoke_contract::<(), InvokeError>(executor, &Symbol::new(env, "execute"), args);

    // A settled loan consumed the allowance; a failed one left it in place.
    token_client.approve(&pool, executor, &0i128, &expiration);

    match outcome {
        Ok(Ok(())) => Ok(()),
        Err(Ok(InvokeError::Contract(code))) => {
            log!(env, "flash loan settlement failed: code", code);
            Err(settlement_error(code))
        }
        _ => {
            log!(env, "flash loan settlement aborted");
            Err(Error::CallbackFailed)
        }
    }
}
