#![cfg(test)]

use super::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{contract, contractimpl, token, Address, Bytes, BytesN, Env};

fn create_test_token<'a>(
    env: &'a Env,
    admin: &'a Address,
) -> (Address, token::Client<'a>, token::StellarAssetClient<'a>) {
    let contract_address = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    (
        contract_address.clone(),
        token::Client::new(env, &contract_address),
        token::StellarAssetClient::new(env, &contract_address),
    )
}

#[contract]
pub struct Repayer;

#[contractimpl]
impl Repayer {
    pub fn on_flash_loan(
        env: Env,
        lender: Address,
        _initiator: Address,
        token: Address,
        amount: u128,
        fee: u128,
        _data: Bytes,
    ) -> BytesN<32> {
        let repay = (amount + fee) as i128;
        token::Client::new(&env, &token).transfer(&env.current_contract_address(), &lender, &repay);
        BytesN::from_array(&env, &CALLBACK_SUCCESS)
    }
}

#[contract]
pub struct PrincipalOnly;

#[contractimpl]
impl PrincipalOnly {
    pub fn on_flash_loan(
        env: Env,
        lender: Address,
        _initiator: Address,
        token: Address,
        amount: u128,
        _fee: u128,
        _data: Bytes,
    ) -> BytesN<32> {
        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &lender,
            &(amount as i128),
        );
        BytesN::from_array(&env, &CALLBACK_SUCCESS)
    }
}

#[contract]
pub struct SilentRepayer;

#[contractimpl]
impl SilentRepayer {
    pub fn on_flash_loan(
        env: Env,
        lender: Address,
        _initiator: Address,
        token: Address,
        amount: u128,
        fee: u128,
        _data: Bytes,
    ) -> BytesN<32> {
        let repay = (amount + fee) as i128;
        token::Client::new(&env, &token).transfer(&env.current_contract_address(), &lender, &repay);
        BytesN::from_array(&env, &[0u8; 32])
    }
}

#[contract]
pub struct Reverter;

#[contractimpl]
impl Reverter {
    pub fn on_flash_loan(
        _env: Env,
        _lender: Address,
        _initiator: Address,
        _token: Address,
        _amount: u128,
        _fee: u128,
        _data: Bytes,
    ) -> BytesN<32> {
        panic!("receiver refuses");
    }
}

struct Setup<'a> {
    pool: Address,
    initiator: Address,
    token_id: Address,
    token: token::Client<'a>,
    token_admin: token::StellarAssetClient<'a>,
    executor: LoanExecutorClient<'a>,
}

fn setup<'a>(env: &'a Env, admin: &'a Address) -> Setup<'a> {
    let (token_id, token, token_admin) = create_test_token(env, admin);
    let pool = Address::generate(env);
    let initiator = Address::generate(env);
    token_admin.mint(&pool, &1_000i128);

    let executor_id = env.register(LoanExecutor, ());
    let executor = LoanExecutorClient::new(env, &executor_id);
    let expiration = env.ledger().sequence();
    token.approve(&pool, &executor_id, &100i128, &expiration);

    Setup {
        pool,
        initiator,
        token_id,
        token,
        token_admin,
        executor,
    }
}

#[test]
fn test_execute_settles_repaid_loan() {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let s = setup(&env, &admin);

    let receiver = env.register(Repayer, ());
    s.token_admin.mint(&receiver, &10i128);

    s.executor.execute(
        &s.pool,
        &s.initiator,
        &receiver,
        &s.token_id,
        &100u128,
        &5u128,
        &1_005u128,
        &Bytes::new(&env),
    );

    assert_eq!(s.token.balance(&s.pool), 1_005i128);
    assert_eq!(s.token.balance(&receiver), 5i128);
    assert_eq!(s.token.allowance(&s.pool, &s.executor.address), 0i128);
}

#[test]
fn test_execute_rolls_back_short_repayment() {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let s = setup(&env, &admin);

    let receiver = env.register(PrincipalOnly, ());
    s.token_admin.mint(&receiver, &10i128);

    let result = s.executor.try_execute(
        &s.pool,
        &s.initiator,
        &receiver,
        &s.token_id,
        &100u128,
        &5u128,
        &1_005u128,
        &Bytes::new(&env),
    );

    assert_eq!(result, Err(Ok(SettlementError::RepaymentNotMet)));
    assert_eq!(s.token.balance(&s.pool), 1_000i128);
    assert_eq!(s.token.balance(&receiver), 10i128);
    assert_eq!(s.token.allowance(&s.pool, &s.executor.address), 100i128);
}

#[test]
fn test_execute_rejects_bad_acknowledgement() {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let s = setup(&env, &admin);

    let receiver = env.register(SilentRepayer, ());
    s.token_admin.mint(&receiver, &10i128);

    let result = s.executor.try_execute(
        &s.pool,
        &s.initiator,
        &receiver,
        &s.token_id,
        &100u128,
        &5u128,
        &1_005u128,
        &Bytes::new(&env),
    );

    assert_eq!(result, Err(Ok(SettlementError::BadAcknowledgement)));
    assert_eq!(s.token.balance(&s.pool), 1_000i128);
    assert_eq!(s.token.balance(&receiver), 10i128);
}

#[test]
fn test_execute_reports_failed_callback() {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let s = setup(&env, &admin);

    let receiver = env.register(Reverter, ());

    let result = s.executor.try_execute(
        &s.pool,
        &s.initiator,
        &receiver,
        &s.token_id,
        &100u128,
        &0u128,
        &1_000u128,
        &Bytes::new(&env),
    );

    assert_eq!(result, Err(Ok(SettlementError::CallbackFailed)));
    assert_eq!(s.token.balance(&s.pool), 1_000i128);
    assert_eq!(s.token.balance(&receiver), 0i128);
}

#[test]
#[should_panic]
fn test_execute_requires_pool_auth() {
    let env = Env::default();
    let admin = Address::generate(&env);
    let (token_id, _token, _token_admin) = create_test_token(&env, &admin);
    let pool = Address::generate(&env);

    let executor_id = env.register(LoanExecutor, ());
    let executor = LoanExecutorClient::new(&env, &executor_id);
    let receiver = env.register(Repayer, ());

    // No auth from the pool: the executor must refuse to move anything.
    executor.execute(
        &pool,
        &Address::generate(&env),
        &receiver,
        &token_id,
        &100u128,
        &0u128,
        &1_000u128,
        &Bytes::new(&env),
    );
}
