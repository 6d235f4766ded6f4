#![no_std]

use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, log, token, Address, Bytes, BytesN,
    Env,
};

/// Acknowledgement a receiver must return from `on_flash_loan`:
/// keccak256("ERC3156FlashBorrower.onFlashLoan").
pub const CALLBACK_SUCCESS: [u8; 32] = [
    0x43, 0x91, 0x48, 0xf0, 0xbb, 0xc6, 0x82, 0xca, 0x07, 0x9e, 0x46, 0xd6, 0xe2, 0xc2, 0xf0,
    0xc1, 0xe3, 0xb8, 0x20, 0xf1, 0xa2, 0x91, 0xb0, 0x69, 0xd8, 0x88, 0x2a, 0xbf, 0x8c, 0xf1,
    0x8d, 0xd9,
];

/// Interface a flash loan receiver exposes.
///
/// The receiver gets `amount` of `token` before the call and must have sent
/// `amount + fee` back to `lender` by the time it returns.
#[contractclient(name = "FlashBorrowerClient")]
pub trait FlashBorrower {
    fn on_flash_loan(
        env: Env,
        lender: Address,
        initiator: Address,
        token: Address,
        amount: u128,
        fee: u128,
        data: Bytes,
    ) -> BytesN<32>;
}

/// Codes are read back by the lender as `InvokeError::Contract(code)`.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum SettlementError {
    CallbackFailed = 1,
    BadAcknowledgement = 2,
    RepaymentNotMet = 3,
    InvalidBalance = 4,
    AmountOverflow = 5,
}

/// Runs the disbursement, the borrower callback and the repayment check in
/// one frame. Any error rolls the whole frame back, including the transfer
/// to the receiver and everything the receiver did with the funds.
#[contract]
pub struct LoanExecutor;

#[contractimpl]
impl LoanExecutor {
    /// Move `amount` from `pool` to `receiver` through the allowance the pool
    /// granted this contract, invoke the receiver, then require the pool to
    /// hold at least `required_balance`.
    pub fn execute(
        env: Env,
        pool: Address,
        initiator: Address,
        receiver: Address,
        token: Address,
        amount: u128,
        fee: u128,
        required_balance: u128,
        data: Bytes,
    ) -> Result<(), SettlementError> {
        pool.require_auth();
        let amount_i128 = i128::try_from(amount).map_err(|_| SettlementError::AmountOverflow)?;

        let token_client = token::Client::new(&env, &token);
        token_client.transfer_from(
            &env.current_contract_address(),
            &pool,
            &receiver,
            &amount_i128,
        );

        let borrower = FlashBorrowerClient::new(&env, &receiver);
        match borrower.try_on_flash_loan(&pool, &initiator, &token, &amount, &fee, &data) {
            Ok(Ok(ack)) if ack == BytesN::from_array(&env, &CALLBACK_SUCCESS) => {}
            Ok(_) => {
                log!(&env, "flash loan callback returned a bad acknowledgement");
                return Err(SettlementError::BadAcknowledgement);
            }
            Err(_) => {
                log!(&env, "flash loan callback failed");
                return Err(SettlementError::CallbackFailed);
            }
        }

        let balance_after = token_client.balance(&pool);
        if balance_after < 0 {
            return Err(SettlementError::InvalidBalance);
        }
        if (balance_after as u128) < required_balance {
            log!(
                &env,
                "flash loan not repaid: balance, required",
                balance_after as u128,
                required_balance
            );
            return Err(SettlementError::RepaymentNotMet);
        }
        Ok(())
    }
}

mod test;
