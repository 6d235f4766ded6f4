use soroban_sdk::{contract, contractimpl, log, token, Address, Bytes, Env};

use crate::constants::*;
use crate::errors::Error;
use crate::events::*;
use crate::guards::*;
use crate::helpers::*;
use crate::storage::*;

#[contract]
pub struct FlashLedger;

#[contractimpl]
impl FlashLedger {
    /// One-time setup. `executor` is the `LoanExecutor` that settles loans for this pool.
    pub fn initialize(
        env: Env,
        admin: Address,
        executor: Address,
        settings: RiskSettings,
    ) -> Result<(), Error> {
        if is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        admin.require_auth();
        if executor == env.current_contract_address() {
            return Err(Error::InvalidAddress);
        }
        validate_settings(&settings)?;

        write_admin(&env, &admin);
        write_executor(&env, &executor);
        write_settings(&env, &settings);
        write_paused(&env, false);
        write_supported_count(&env, 0);
        write_breaker(
            &env,
            &BreakerState {
                anomaly_count: 0,
                last_reset: env.ledger().timestamp(),
            },
        );
        env.storage().persistent().set(&DataKey::Initialized, &true);
        bump_core_ttl(&env);

        LedgerInitialized {
            admin,
            executor,
            cooldown_ledgers: settings.cooldown_ledgers,
            max_utilization_bps: settings.max_utilization_bps,
            anomaly_threshold: settings.anomaly_threshold,
        }
        .publish(&env);
        Ok(())
    }

    /// Admin: overwrite the configuration of `token`.
    /// Enabling a previously unsupported asset takes one of `MAX_SUPPORTED_ASSETS` slots.
    pub fn configure_asset(
        env: Env,
        admin: Address,
        token: Address,
        supported: bool,
        max_loan: u128,
        fee_bps: u32,
        max_daily_volume: u128,
    ) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        if is_reserved_address(&env, &token)? {
            return Err(Error::InvalidAddress);
        }
        if fee_bps > MAX_FEE_BPS {
            return Err(Error::FeeTooHigh);
        }

        let previous = read_asset_config(&env, &token);
        let count = read_supported_count(&env);
        if supported && !previous.supported {
            if count >= MAX_SUPPORTED_ASSETS {
                return Err(Error::AssetLimitReached);
            }
            write_supported_count(&env, count + 1);
        } else if !supported && previous.supported {
            let next = count.checked_sub(1).ok_or(Error::ArithmeticOverflow)?;
            write_supported_count(&env, next);
        }

        let config = AssetConfig {
            supported,
            max_loan,
            fee_bps,
            max_daily_volume,
        };
        write_asset_config(&env, &token, &config);

        AssetConfigured {
            token,
            supported,
            max_loan,
            fee_bps,
            max_daily_volume,
        }
        .publish(&env);
        Ok(())
    }

    /// Fund the pool with `amount` of a supported asset.
    pub fn deposit(env: Env, from: Address, token: Address, amount: u128) -> Result<(), Error> {
        ensure_initialized(&env)?;
        if read_paused(&env) {
            return Err(reject(&env, Rejection::Paused));
        }
        from.require_auth();
        enforce(&env, check_amount(amount))?;
        if is_reserved_address(&env, &token)? {
            return Err(Error::InvalidAddress);
        }
        if !read_asset_config(&env, &token).supported {
            return Err(reject(&env, Rejection::Unsupported));
        }

        let mut ledger = read_asset_ledger(&env, &token);
        ledger.total_principal = ledger
            .total_principal
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        token::Client::new(&env, &token).transfer(
            &from,
            &env.current_contract_address(),
            &to_i128(amount)?,
        );
        write_asset_ledger(&env, &token, &ledger);

        Deposited {
            from,
            token,
            amount,
            total_principal: ledger.total_principal,
        }
        .publish(&env);
        Ok(())
    }

    /// Admin: withdraw committed principal to the admin. Accumulated fees stay covered.
    pub fn withdraw(env: Env, admin: Address, token: Address, amount: u128) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        enforce(&env, check_amount(amount))?;

        let mut ledger = read_asset_ledger(&env, &token);
        let balance = pool_balance(&env, &token)?;
        enforce(
            &env,
            check_withdrawal(
                amount,
                ledger.total_principal,
                balance,
                ledger.accumulated_fees,
            ),
        )?;
        ledger.total_principal -= amount;
        write_asset_ledger(&env, &token, &ledger);

        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &admin,
            &to_i128(amount)?,
        );

        Withdrawn {
            to: admin,
            token,
            amount,
            total_principal: ledger.total_principal,
        }
        .publish(&env);
        Ok(())
    }

    /// Admin: send every accumulated fee of `token` to `to`. Returns the amount swept.
    pub fn sweep_fees(env: Env, admin: Address, token: Address, to: Address) -> Result<u128, Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        if to == env.current_contract_address() {
            return Err(Error::InvalidAddress);
        }

        let mut ledger = read_asset_ledger(&env, &token);
        let amount = ledger.accumulated_fees;
        if amount > 0 {
            ledger.accumulated_fees = 0;
            write_asset_ledger(&env, &token, &ledger);
            token::Client::new(&env, &token).transfer(
                &env.current_contract_address(),
                &to,
                &to_i128(amount)?,
            );
        }

        FeesSwept { token, to, amount }.publish(&env);
        Ok(amount)
    }

    /// Admin: move tokens sent to the pool by mistake.
    /// Only unsupported assets qualify, and tracked principal and fees are left in place.
    pub fn recover_token(
        env: Env,
        admin: Address,
        token: Address,
        to: Address,
    ) -> Result<u128, Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        if is_reserved_address(&env, &token)? || to == env.current_contract_address() {
            return Err(Error::InvalidAddress);
        }
        if read_asset_config(&env, &token).supported {
            return Err(Error::SupportedAssetRecovery);
        }

        let ledger = read_asset_ledger(&env, &token);
        let tracked = ledger
            .total_principal
            .checked_add(ledger.accumulated_fees)
            .ok_or(Error::ArithmeticOverflow)?;
        let amount = pool_balance(&env, &token)?.saturating_sub(tracked);
        if amount > 0 {
            token::Client::new(&env, &token).transfer(
                &env.current_contract_address(),
                &to,
                &to_i128(amount)?,
            );
        }

        TokenRecovered { token, to, amount }.publish(&env);
        Ok(amount)
    }

    /// Admin: minimum ledgers between two loans to the same receiver (at least 1).
    pub fn set_cooldown(env: Env, admin: Address, cooldown_ledgers: u32) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        let mut settings = read_settings(&env)?;
        settings.cooldown_ledgers = cooldown_ledgers;
        validate_settings(&settings)?;
        write_settings(&env, &settings);
        CooldownUpdated { cooldown_ledgers }.publish(&env);
        Ok(())
    }

    /// Admin: ceiling on the share of the pool one loan may draw, in bps (1..=10_000).
    pub fn set_max_utilization(
        env: Env,
        admin: Address,
        max_utilization_bps: u32,
    ) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        let mut settings = read_settings(&env)?;
        settings.max_utilization_bps = max_utilization_bps;
        validate_settings(&settings)?;
        write_settings(&env, &settings);
        UtilizationCeilingUpdated {
            max_utilization_bps,
        }
        .publish(&env);
        Ok(())
    }

    /// Admin: failed loans tolerated before new loans are refused (at least 1).
    pub fn set_anomaly_threshold(
        env: Env,
        admin: Address,
        anomaly_threshold: u32,
    ) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        let mut settings = read_settings(&env)?;
        settings.anomaly_threshold = anomaly_threshold;
        validate_settings(&settings)?;
        write_settings(&env, &settings);
        AnomalyThresholdUpdated { anomaly_threshold }.publish(&env);
        Ok(())
    }

    /// Admin: block new loans and deposits.
    pub fn pause(env: Env, admin: Address) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        write_paused(&env, true);
        PauseUpdated { paused: true }.publish(&env);
        Ok(())
    }

    /// Admin: lift the pause.
    pub fn unpause(env: Env, admin: Address) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        write_paused(&env, false);
        PauseUpdated { paused: false }.publish(&env);
        Ok(())
    }

    /// Admin: clear the anomaly counter and reopen the loan path.
    pub fn reset_circuit_breaker(env: Env, admin: Address) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        let cleared = read_breaker(&env).anomaly_count;
        let timestamp = env.ledger().timestamp();
        write_breaker(
            &env,
            &BreakerState {
                anomaly_count: 0,
                last_reset: timestamp,
            },
        );
        CircuitBreakerReset { cleared, timestamp }.publish(&env);
        Ok(())
    }

    /// Admin: queue a withdrawal that becomes executable after `EMERGENCY_WITHDRAWAL_DELAY`.
    /// A new request replaces any pending one for the same token.
    pub fn initiate_emergency_withdrawal(
        env: Env,
        admin: Address,
        token: Address,
        amount: u128,
        to: Address,
    ) -> Result<u64, Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        enforce(&env, check_amount(amount))?;
        if is_reserved_address(&env, &token)? || to == env.current_contract_address() {
            return Err(Error::InvalidAddress);
        }
        let unlock_time = env
            .ledger()
            .timestamp()
            .checked_add(EMERGENCY_WITHDRAWAL_DELAY)
            .ok_or(Error::ArithmeticOverflow)?;
        write_pending_withdrawal(
            &env,
            &token,
            &PendingWithdrawal {
                amount,
                to: to.clone(),
                unlock_time,
            },
        );
        EmergencyWithdrawalInitiated {
            token,
            to,
            amount,
            unlock_time,
        }
        .publish(&env);
        Ok(unlock_time)
    }

    /// Admin: pay out a pending emergency withdrawal once its delay has passed.
    /// Returns the amount transferred, which is capped at the pool balance.
    pub fn execute_emergency_withdrawal(
        env: Env,
        admin: Address,
        token: Address,
    ) -> Result<u128, Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        let pending = read_pending_withdrawal(&env, &token).ok_or(Error::NoPendingWithdrawal)?;
        if env.ledger().timestamp() < pending.unlock_time {
            log!(
                &env,
                "emergency withdrawal locked until",
                pending.unlock_time
            );
            return Err(Error::WithdrawalLocked);
        }

        let balance = pool_balance(&env, &token)?;
        let amount = pending.amount.min(balance);
        let remaining = balance - amount;

        let mut ledger = read_asset_ledger(&env, &token);
        ledger.total_principal -= amount.min(ledger.total_principal);
        ledger.accumulated_fees = ledger.accumulated_fees.min(remaining);
        write_asset_ledger(&env, &token, &ledger);
        remove_pending_withdrawal(&env, &token);

        if amount > 0 {
            token::Client::new(&env, &token).transfer(
                &env.current_contract_address(),
                &pending.to,
                &to_i128(amount)?,
            );
        }

        EmergencyWithdrawalExecuted {
            token,
            to: pending.to,
            amount,
        }
        .publish(&env);
        Ok(amount)
    }

    /// Admin: drop the pending emergency withdrawal for `token`.
    pub fn cancel_emergency_withdrawal(
        env: Env,
        admin: Address,
        token: Address,
    ) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        if read_pending_withdrawal(&env, &token).is_none() {
            return Err(Error::NoPendingWithdrawal);
        }
        remove_pending_withdrawal(&env, &token);
        EmergencyWithdrawalCancelled { token }.publish(&env);
        Ok(())
    }

    /// Admin: hand the admin role to `new_admin`.
    pub fn set_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), Error> {
        ensure_initialized(&env)?;
        require_admin(&env, &admin)?;
        write_admin(&env, &new_admin);
        NewAdmin {
            old_admin: admin,
            new_admin,
        }
        .publish(&env);
        Ok(())
    }

    /// Lend `amount` of `token` to `receiver` for the duration of its `on_flash_loan` callback.
    ///
    /// Checks run in a fixed order and the first failure is returned as an error with
    /// nothing changed. Once funds have been handed to the executor, a callback or
    /// repayment failure is rolled back, recorded on the circuit breaker, and reported
    /// as `Ok(false)` with a `LoanAborted` event naming the reason.
    pub fn flash_loan(
        env: Env,
        initiator: Address,
        receiver: Address,
        token: Address,
        amount: u128,
        data: Bytes,
    ) -> Result<bool, Error> {
        ensure_initialized(&env)?;
        initiator.require_auth();

        if read_paused(&env) {
            return Err(reject(&env, Rejection::Paused));
        }
        let settings = read_settings(&env)?;
        let breaker = read_breaker(&env);
        enforce(&env, check_breaker(&breaker, settings.anomaly_threshold))?;
        let _lock = enforce(&env, LoanLock::acquire(&env))?;
        enforce(&env, check_amount(amount))?;
        if is_reserved_address(&env, &token)? {
            return Err(Error::InvalidAddress);
        }

        let now_ledger = env.ledger().sequence();
        enforce(
            &env,
            check_cooldown(
                read_last_loan_ledger(&env, &receiver),
                settings.cooldown_ledgers,
                now_ledger,
            ),
        )?;

        let balance_before = pool_balance(&env, &token)?;
        enforce(&env, check_liquidity(amount, balance_before))?;

        let config = read_asset_config(&env, &token);
        enforce(&env, check_asset(&config, amount))?;
        enforce(
            &env,
            check_utilization(amount, balance_before, settings.max_utilization_bps),
        )?;

        let mut ledger = read_asset_ledger(&env, &token);
        let volume = enforce(
            &env,
            ledger
                .volume
                .reserve(current_day(&env), amount, config.max_daily_volume),
        )?;
        let fee = enforce(&env, quote_fee(amount, config.fee_bps))?;
        let required_balance = balance_before
            .checked_add(fee)
            .ok_or(Error::ArithmeticOverflow)?;

        let terms = LoanTerms {
            initiator: initiator.clone(),
            receiver: receiver.clone(),
            token: token.clone(),
            amount,
            fee,
            required_balance,
            data,
        };
        if let Err(error) = settle(&env, &read_executor(&env)?, &terms) {
            let tripped = enforce(&env, breaker.record_anomaly())?;
            write_breaker(&env, &tripped);
            AnomalyRecorded {
                anomaly_count: tripped.anomaly_count,
                threshold: settings.anomaly_threshold,
            }
            .publish(&env);
            LoanAborted {
                receiver,
                token,
                initiator,
                amount,
                reason: error as u32,
            }
            .publish(&env);
            return Ok(false);
        }

        ledger.accumulated_fees = ledger
            .accumulated_fees
            .checked_add(fee)
            .ok_or(Error::ArithmeticOverflow)?;
        ledger.successful_loans = ledger
            .successful_loans
            .checked_add(1)
            .ok_or(Error::ArithmeticOverflow)?;
        ledger.volume = volume;
        write_asset_ledger(&env, &token, &ledger);
        write_last_loan_ledger(&env, &receiver, now_ledger);

        FlashLoan {
            receiver,
            token,
            initiator,
            amount,
            fee,
        }
        .publish(&env);
        Ok(true)
    }

    /// Largest loan currently quotable for `token`; 0 when unsupported.
    pub fn max_flash_loan(env: Env, token: Address) -> Result<u128, Error> {
        let config = read_asset_config(&env, &token);
        if !config.supported {
            return Ok(0);
        }
        let ledger = read_asset_ledger(&env, &token);
        Ok(max_loan_for(
            &config,
            pool_balance(&env, &token)?,
            ledger.accumulated_fees,
        ))
    }

    pub fn flash_fee(env: Env, token: Address, amount: u128) -> Result<u128, Error> {
        let config = read_asset_config(&env, &token);
        if !config.supported {
            return Err(Error::UnsupportedAsset);
        }
        enforce(&env, quote_fee(amount, config.fee_bps))
    }

    pub fn available_liquidity(env: Env, token: Address) -> Result<u128, Error> {
        pool_balance(&env, &token)
    }

    pub fn is_supported(env: Env, token: Address) -> bool {
        read_asset_config(&env, &token).supported
    }

    pub fn get_asset_config(env: Env, token: Address) -> AssetConfig {
        read_asset_config(&env, &token)
    }

    pub fn supported_asset_count(env: Env) -> u32 {
        read_supported_count(&env)
    }

    pub fn asset_ledger(env: Env, token: Address) -> AssetLedger {
        read_asset_ledger(&env, &token)
    }

    pub fn total_principal(env: Env, token: Address) -> u128 {
        read_asset_ledger(&env, &token).total_principal
    }

    pub fn accumulated_fees(env: Env, token: Address) -> u128 {
        read_asset_ledger(&env, &token).accumulated_fees
    }

    /// Volume drawn today; reads 0 once the day has rolled over.
    pub fn daily_volume_used(env: Env, token: Address) -> u128 {
        read_asset_ledger(&env, &token)
            .volume
            .used_on(current_day(&env))
    }

    pub fn successful_loans(env: Env, token: Address) -> u64 {
        read_asset_ledger(&env, &token).successful_loans
    }

    pub fn last_loan_ledger(env: Env, borrower: Address) -> Option<u32> {
        read_last_loan_ledger(&env, &borrower)
    }

    pub fn settings(env: Env) -> Result<RiskSettings, Error> {
        read_settings(&env)
    }

    pub fn circuit_breaker(env: Env) -> BreakerState {
        read_breaker(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        read_paused(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        read_admin(&env)
    }

    pub fn get_executor(env: Env) -> Result<Address, Error> {
        read_executor(&env)
    }

    pub fn pending_emergency_withdrawal(env: Env, token: Address) -> Option<PendingWithdrawal> {
        read_pending_withdrawal(&env, &token)
    }
}
