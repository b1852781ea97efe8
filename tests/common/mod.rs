//! Shared mocks for integration tests.
#![allow(dead_code)]

use alloy::dyn_abi::TypedData;
use alloy::primitives::{keccak256, Address, Bytes, Signature, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use private_token::abi::default_interface;
use private_token::blockchain::{
    BlockchainError, BlockchainResult, ChainId, Ledger, TxReceipt, WalletProvider,
};
use private_token::config::{resolve, FileConfig, TokenConfig};
use private_token::fhe::{
    DecryptionWindow, EncryptedInput, EncryptedPayload, EncryptionError, EncryptionRuntime,
    EncryptionSession, KeyPair, NetworkProfile, SessionManager, SessionSettings, SharedSession,
    UserDecryptRequest,
};
use private_token::token::contract::IConfidentialToken;
use private_token::TokenClient;

pub const TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const USER: Address = Address::repeat_byte(0x42);
pub const SEPOLIA: u64 = 11_155_111;

/// Handle the ledger reports for the caller's balance.
pub const BALANCE_HANDLE: B256 = B256::repeat_byte(0xbb);
/// Handle the encryption session returns for transfer amounts.
pub const AMOUNT_HANDLE: B256 = B256::repeat_byte(0xaa);

pub fn test_config() -> TokenConfig {
    let vars = HashMap::from([
        ("PRIVATE_TOKEN_CONTRACT_ADDRESS".to_string(), TOKEN.to_string()),
        ("PRIVATE_TOKEN_BUILD_MODE".to_string(), "production".to_string()),
    ]);
    let mut config = resolve(&vars, FileConfig::default()).unwrap().config;
    config.session.poll_interval_ms = 5;
    config.session.load_timeout_ms = 200;
    config.transfer.receipt_poll_interval_ms = 5;
    config.transfer.confirmation_timeout_secs = 2;
    config
}

pub fn test_settings() -> SessionSettings {
    SessionSettings {
        poll_interval: Duration::from_millis(5),
        load_timeout: Duration::from_millis(200),
    }
}

pub fn sessions(runtime: Arc<MockRuntime>) -> SessionManager {
    SessionManager::new(runtime, NetworkProfile::sepolia(), test_settings())
}

/// Client wired to `chain` as both wallet and ledger.
pub fn client(chain: &Arc<MockChain>, runtime: &Arc<MockRuntime>) -> TokenClient {
    TokenClient::new(
        Arc::new(test_config()),
        Some(chain.clone() as Arc<dyn WalletProvider>),
        chain.clone() as Arc<dyn Ledger>,
        sessions(runtime.clone()),
        &default_interface(),
    )
    .unwrap()
}

/// Client wired to `chain` with a caller-supplied configuration.
pub fn client_with_config(
    config: TokenConfig,
    chain: &Arc<MockChain>,
    runtime: &Arc<MockRuntime>,
) -> TokenClient {
    let settings = SessionSettings::from(&config.session);
    TokenClient::new(
        Arc::new(config),
        Some(chain.clone() as Arc<dyn WalletProvider>),
        chain.clone() as Arc<dyn Ledger>,
        SessionManager::new(runtime.clone(), NetworkProfile::sepolia(), settings),
        &default_interface(),
    )
    .unwrap()
}

pub fn client_without_wallet(chain: &Arc<MockChain>, runtime: &Arc<MockRuntime>) -> TokenClient {
    TokenClient::new(
        Arc::new(test_config()),
        None,
        chain.clone() as Arc<dyn Ledger>,
        sessions(runtime.clone()),
        &default_interface(),
    )
    .unwrap()
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature);
    [hash[0], hash[1], hash[2], hash[3]]
}

fn input_of(tx: &TransactionRequest) -> Bytes {
    tx.input.input().cloned().unwrap_or_default()
}

/// Knobs for [`MockChain`].
pub struct ChainState {
    pub chain_id: u64,
    pub accept_switch: bool,
    pub code: Bytes,
    pub balance_handle: B256,
    pub simulation_error: Option<fn() -> BlockchainError>,
    pub send_error: Option<fn() -> BlockchainError>,
    pub sign_error: Option<fn() -> BlockchainError>,
    pub revert_transfers: bool,
    pub revert_access: bool,
    /// Every wallet and ledger request, in order.
    pub requests: Vec<&'static str>,
    pub simulations: Vec<TransactionRequest>,
    pub sent: Vec<TransactionRequest>,
    pub signed: Vec<TypedData>,
    receipts: HashMap<TxHash, bool>,
}

/// In-memory wallet and ledger.
pub struct MockChain {
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ChainState {
                chain_id: SEPOLIA,
                accept_switch: true,
                code: Bytes::from_static(&[0x60, 0x80]),
                balance_handle: BALANCE_HANDLE,
                simulation_error: None,
                send_error: None,
                sign_error: None,
                revert_transfers: false,
                revert_access: false,
                requests: Vec::new(),
                simulations: Vec::new(),
                sent: Vec::new(),
                signed: Vec::new(),
                receipts: HashMap::new(),
            }),
        })
    }

    pub fn configure(self: &Arc<Self>, f: impl FnOnce(&mut ChainState)) -> Arc<Self> {
        f(&mut self.state.lock().unwrap());
        self.clone()
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<&'static str> {
        self.state().requests.clone()
    }

    fn record(&self, request: &'static str) {
        self.state().requests.push(request);
    }
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.record("chain_id");
        Ok(self.state().chain_id)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> BlockchainResult<()> {
        self.record("switch_chain");
        let mut state = self.state();
        if !state.accept_switch {
            return Err(BlockchainError::UserRejected);
        }
        state.chain_id = chain_id.0;
        Ok(())
    }

    async fn address(&self) -> BlockchainResult<Address> {
        self.record("address");
        Ok(USER)
    }

    async fn sign_typed_data(&self, payload: &TypedData) -> BlockchainResult<Signature> {
        self.record("sign_typed_data");
        let mut state = self.state();
        if let Some(err) = state.sign_error {
            return Err(err());
        }
        state.signed.push(payload.clone());
        Ok(Signature::new(U256::from(1), U256::from(2), false))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        self.record("send_transaction");
        let mut state = self.state();
        if let Some(err) = state.send_error {
            return Err(err());
        }
        let is_transfer = input_of(&tx).starts_with(&IConfidentialToken::transferCall::SELECTOR);
        let success = if is_transfer {
            !state.revert_transfers
        } else {
            !state.revert_access
        };
        let tx_hash = TxHash::with_last_byte(state.sent.len() as u8 + 1);
        state.receipts.insert(tx_hash, success);
        state.sent.push(tx);
        Ok(tx_hash)
    }
}

#[async_trait]
impl Ledger for MockChain {
    async fn get_code(&self, _address: Address) -> BlockchainResult<Bytes> {
        self.record("get_code");
        Ok(self.state().code.clone())
    }

    async fn call(&self, tx: TransactionRequest) -> BlockchainResult<Bytes> {
        self.record("call");
        let mut state = self.state();
        let input = input_of(&tx);
        if input.starts_with(&selector("balanceOf(address)")) {
            return Ok(Bytes::copy_from_slice(state.balance_handle.as_slice()));
        }
        state.simulations.push(tx);
        if let Some(err) = state.simulation_error {
            return Err(err());
        }
        // `true` as an ABI word.
        Ok(Bytes::copy_from_slice(B256::with_last_byte(1).as_slice()))
    }

    async fn get_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<TxReceipt>> {
        self.record("get_receipt");
        Ok(self.state().receipts.get(&tx_hash).map(|success| TxReceipt {
            tx_hash,
            block_number: Some(1),
            success: *success,
        }))
    }
}

/// Knobs for [`MockSession`].
pub struct SessionBehavior {
    pub handles: Vec<B256>,
    pub input_proof: Bytes,
    pub omit_result: bool,
    pub fail_encrypt: bool,
    pub encrypted: Vec<EncryptedInput>,
    pub decrypt_requests: Vec<UserDecryptRequest>,
    pub authorizations: Vec<(String, Vec<Address>, DecryptionWindow)>,
}

impl Default for SessionBehavior {
    fn default() -> Self {
        Self {
            handles: vec![AMOUNT_HANDLE],
            input_proof: Bytes::from_static(&[0x01, 0x02, 0x03]),
            omit_result: false,
            fail_encrypt: false,
            encrypted: Vec::new(),
            decrypt_requests: Vec::new(),
            authorizations: Vec::new(),
        }
    }
}

/// EIP-712 payload as an encryption host would return it.
pub fn authorization_json(contract: Address) -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "chainId", "type": "uint256" }
            ],
            "UserDecryptRequestVerification": [
                { "name": "publicKey", "type": "bytes" },
                { "name": "contractAddresses", "type": "address[]" }
            ]
        },
        "primaryType": "UserDecryptRequestVerification",
        "domain": { "name": "Decryption", "chainId": "0xaa36a7" },
        "message": {
            "publicKey": "0x0102",
            "contractAddresses": [contract.to_string()]
        }
    })
}

pub fn authorization_payload(contract: Address) -> TypedData {
    serde_json::from_value(authorization_json(contract)).unwrap()
}

/// One encryption instance.
pub struct MockSession {
    pub id: u32,
    behavior: Arc<Mutex<SessionBehavior>>,
}

#[async_trait]
impl EncryptionSession for MockSession {
    async fn encrypt(&self, input: EncryptedInput) -> Result<EncryptedPayload, EncryptionError> {
        let mut behavior = self.behavior.lock().unwrap();
        if behavior.fail_encrypt {
            return Err(EncryptionError::Service("instance expired".into()));
        }
        behavior.encrypted.push(input);
        Ok(EncryptedPayload {
            handles: behavior.handles.clone(),
            input_proof: behavior.input_proof.clone(),
        })
    }

    async fn generate_keypair(&self) -> Result<KeyPair, EncryptionError> {
        Ok(KeyPair {
            public_key: "0x0102".into(),
            private_key: "0x0304".into(),
        })
    }

    async fn create_eip712(
        &self,
        public_key: &str,
        contracts: &[Address],
        window: DecryptionWindow,
    ) -> Result<TypedData, EncryptionError> {
        self.behavior
            .lock()
            .unwrap()
            .authorizations
            .push((public_key.to_string(), contracts.to_vec(), window));
        Ok(authorization_payload(contracts[0]))
    }

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<HashMap<B256, String>, EncryptionError> {
        let mut behavior = self.behavior.lock().unwrap();
        let mut results = HashMap::new();
        if !behavior.omit_result {
            for pair in &request.handles {
                results.insert(pair.handle, "1500000000000000000".to_string());
            }
        } else {
            results.insert(B256::repeat_byte(0xee), "7".to_string());
        }
        behavior.decrypt_requests.push(request);
        Ok(results)
    }
}

/// Encryption runtime counting its initializations.
pub struct MockRuntime {
    pub available: AtomicBool,
    pub fail_init: AtomicBool,
    pub init_delay: Mutex<Duration>,
    pub init_calls: AtomicU32,
    pub instances: AtomicU32,
    pub behavior: Arc<Mutex<SessionBehavior>>,
}

impl MockRuntime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            available: AtomicBool::new(true),
            fail_init: AtomicBool::new(false),
            init_delay: Mutex::new(Duration::ZERO),
            init_calls: AtomicU32::new(0),
            instances: AtomicU32::new(0),
            behavior: Arc::new(Mutex::new(SessionBehavior::default())),
        })
    }

    pub fn behave(&self, f: impl FnOnce(&mut SessionBehavior)) {
        f(&mut self.behavior.lock().unwrap());
    }

    pub fn init_calls(&self) -> u32 {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EncryptionRuntime for MockRuntime {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn init_sdk(&self) -> Result<(), EncryptionError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.init_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(EncryptionError::Service("bootstrap failed".into()));
        }
        Ok(())
    }

    async fn create_instance(
        &self,
        _profile: &NetworkProfile,
    ) -> Result<SharedSession, EncryptionError> {
        let id = self.instances.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Arc::new(MockSession {
            id,
            behavior: self.behavior.clone(),
        }))
    }
}

/// Start a programmable HTTP host on an ephemeral port.
///
/// `handler` receives the method, path and JSON body and returns a status
/// code and JSON body.
pub async fn start_mock_host<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &str, Value) -> (u16, Value) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some((method, path, body)) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = handler(&method, &path, body);
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let body = body.to_string();
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<(String, String, Value)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = (header_end + content_length).min(buf.len());
    let body = serde_json::from_slice(&buf[header_end..end]).unwrap_or(Value::Null);
    Some((method, path, body))
}
