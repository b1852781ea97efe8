//! Balance decryption tests.

use alloy::primitives::{keccak256, Address, Bytes};
use std::time::{SystemTime, UNIX_EPOCH};

use private_token::blockchain::BlockchainError;
use private_token::TokenError;

mod common;
use common::{MockChain, MockRuntime, BALANCE_HANDLE, USER};

fn token() -> Address {
    common::TOKEN.parse().unwrap()
}

#[tokio::test]
async fn test_balance_is_decrypted() {
    let chain = MockChain::new();
    let runtime = MockRuntime::new();
    let client = common::client(&chain, &runtime);

    let balance = client.get_balance().await.unwrap();
    assert_eq!(balance.handle, BALANCE_HANDLE);
    assert_eq!(balance.raw, "1500000000000000000");
    assert_eq!(balance.tokens().as_deref(), Some("1.500000000000000000"));
}

#[tokio::test]
async fn test_balance_access_is_requested_first() {
    let chain = MockChain::new();
    let runtime = MockRuntime::new();
    let client = common::client(&chain, &runtime);

    client.get_balance().await.unwrap();

    let state = chain.state();
    assert_eq!(state.sent.len(), 1);
    assert_eq!(
        state.sent[0].input.input(),
        Some(&Bytes::copy_from_slice(&keccak256("requestBalanceAccess()")[..4]))
    );

    let requests = &state.requests;
    let first_send = requests.iter().position(|r| *r == "send_transaction").unwrap();
    let first_call = requests.iter().position(|r| *r == "call").unwrap();
    let first_sign = requests.iter().position(|r| *r == "sign_typed_data").unwrap();
    assert!(first_send < first_call);
    assert!(first_call < first_sign);
}

#[tokio::test]
async fn test_decrypt_request_is_bound_to_caller_and_contract() {
    let chain = MockChain::new();
    let runtime = MockRuntime::new();
    let client = common::client(&chain, &runtime);

    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    client.get_balance().await.unwrap();
    let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

    let behavior = runtime.behavior.lock().unwrap();
    let (public_key, contracts, window) = &behavior.authorizations[0];
    assert_eq!(public_key, "0x0102");
    assert_eq!(contracts, &vec![token()]);
    assert!(window.start_timestamp >= before - 60 && window.start_timestamp <= after - 60);
    assert_eq!(window.duration_days, 1);

    let request = &behavior.decrypt_requests[0];
    assert_eq!(request.user_address, USER);
    assert_eq!(request.contract_addresses, vec![token()]);
    assert_eq!(request.handles[0].handle, BALANCE_HANDLE);
    assert_eq!(request.handles[0].contract_address, token());
    assert_eq!(request.window, *window);

    assert_eq!(chain.state().signed.len(), 1);
}

#[tokio::test]
async fn test_absent_result_fails() {
    let chain = MockChain::new();
    let runtime = MockRuntime::new();
    runtime.behave(|b| b.omit_result = true);
    let client = common::client(&chain, &runtime);

    let err = client.get_balance().await.unwrap_err();
    assert!(matches!(err, TokenError::DecryptionFailed));
    assert_eq!(err.to_string(), "Failed to decrypt balance");
}

#[tokio::test]
async fn test_rejected_signature() {
    let chain = MockChain::new().configure(|s| s.sign_error = Some(|| BlockchainError::UserRejected));
    let runtime = MockRuntime::new();
    let client = common::client(&chain, &runtime);

    let err = client.get_balance().await.unwrap_err();
    assert_eq!(err.to_string(), "Request rejected by user");
}

#[tokio::test]
async fn test_reverted_access_request() {
    let chain = MockChain::new().configure(|s| s.revert_access = true);
    let runtime = MockRuntime::new();
    let client = common::client(&chain, &runtime);

    let err = client.get_balance().await.unwrap_err();
    assert!(matches!(err, TokenError::TransactionFailed));
    assert_eq!(runtime.init_calls(), 0);
}

#[tokio::test]
async fn test_balance_requires_wallet_and_deployment() {
    let chain = MockChain::new();
    let runtime = MockRuntime::new();
    let err = common::client_without_wallet(&chain, &runtime)
        .get_balance()
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::NoWallet));

    let chain = MockChain::new().configure(|s| s.code = Bytes::new());
    let err = common::client(&chain, &runtime).get_balance().await.unwrap_err();
    assert!(matches!(err, TokenError::NotDeployed));
    assert!(chain.state().sent.is_empty());
}

#[tokio::test]
async fn test_balance_refused_network_switch() {
    let chain = MockChain::new().configure(|s| {
        s.chain_id = 5;
        s.accept_switch = false;
    });
    let runtime = MockRuntime::new();

    let err = common::client(&chain, &runtime).get_balance().await.unwrap_err();
    assert!(matches!(err, TokenError::WrongNetwork(11_155_111)));
}
