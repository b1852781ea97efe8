//! HTTP adapter for an encryption host.
//!
//! The host is a sidecar process wrapping the relayer SDK and exposing its
//! operations as JSON endpoints:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/health` | runtime availability |
//! | POST | `/init` | SDK bootstrap |
//! | POST | `/instances` | instance construction for a network profile |
//! | POST | `/instances/{id}/encrypt` | encrypted input creation |
//! | POST | `/instances/{id}/keypair` | key-pair generation |
//! | POST | `/instances/{id}/eip712` | authorization payload |
//! | POST | `/instances/{id}/user-decrypt` | user decryption |

use alloy::dyn_abi::TypedData;
use alloy::hex;
use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::fhe::runtime::{EncryptionError, EncryptionRuntime, EncryptionSession, SharedSession};
use crate::fhe::types::{
    DecryptionWindow, EncryptedInput, EncryptedPayload, KeyPair, NetworkProfile,
    UserDecryptRequest,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct HostClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HostClient {
    fn endpoint(&self, path: &str) -> Result<Url, EncryptionError> {
        self.base_url
            .join(path)
            .map_err(|e| EncryptionError::Service(format!("Invalid host path '{}': {}", path, e)))
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, EncryptionError> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| EncryptionError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EncryptionError::Service(format!(
                "{} returned {}: {}",
                path, status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EncryptionError::Protocol(format!("{}: {}", path, e)))
    }
}

/// [`EncryptionRuntime`] talking to an encryption host over HTTP.
#[derive(Clone)]
pub struct HttpEncryptionRuntime {
    client: HostClient,
}

impl HttpEncryptionRuntime {
    pub fn new(base_url: &str) -> Result<Self, EncryptionError> {
        // A trailing slash makes `join` append instead of replace.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| EncryptionError::Service(format!("Invalid host URL '{}': {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EncryptionError::Service(e.to_string()))?;

        Ok(Self {
            client: HostClient { http, base_url },
        })
    }
}

#[derive(Deserialize)]
struct InstanceCreated {
    instance_id: String,
}

#[async_trait]
impl EncryptionRuntime for HttpEncryptionRuntime {
    async fn is_available(&self) -> bool {
        let Ok(url) = self.client.endpoint("health") else {
            return false;
        };
        match self.client.http.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::trace!(error = %e, "Encryption host not reachable yet");
                false
            }
        }
    }

    async fn init_sdk(&self) -> Result<(), EncryptionError> {
        let _: serde_json::Value = self.client.post("init", &json!({})).await?;
        Ok(())
    }

    async fn create_instance(
        &self,
        profile: &NetworkProfile,
    ) -> Result<SharedSession, EncryptionError> {
        let created: InstanceCreated = self.client.post("instances", profile).await?;
        tracing::debug!(instance_id = %created.instance_id, "Encryption instance created");
        Ok(Arc::new(HttpEncryptionSession {
            client: self.client.clone(),
            instance_id: created.instance_id,
        }))
    }
}

/// Session bound to one instance on the encryption host.
pub struct HttpEncryptionSession {
    client: HostClient,
    instance_id: String,
}

impl HttpEncryptionSession {
    fn path(&self, op: &str) -> String {
        format!("instances/{}/{}", self.instance_id, op)
    }
}

#[derive(Deserialize)]
struct EncryptResponse {
    handles: Vec<String>,
    input_proof: String,
}

#[derive(Deserialize)]
struct DecryptResponse {
    results: HashMap<String, serde_json::Value>,
}

fn decode_hex(label: &str, value: &str) -> Result<Vec<u8>, EncryptionError> {
    hex::decode(value).map_err(|e| EncryptionError::Protocol(format!("{} is not hex: {}", label, e)))
}

fn decode_handle(value: &str) -> Result<B256, EncryptionError> {
    let bytes = decode_hex("handle", value)?;
    if bytes.len() != 32 {
        return Err(EncryptionError::Protocol(format!(
            "handle must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

/// Decrypted values come back as JSON numbers, strings or booleans.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl EncryptionSession for HttpEncryptionSession {
    async fn encrypt(&self, input: EncryptedInput) -> Result<EncryptedPayload, EncryptionError> {
        let body = json!({
            "contract_address": input.contract_address,
            "user_address": input.user_address,
            "values": input.values.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
        });
        let response: EncryptResponse = self.client.post(&self.path("encrypt"), &body).await?;

        let handles = response
            .handles
            .iter()
            .map(|h| decode_handle(h))
            .collect::<Result<Vec<_>, _>>()?;
        let input_proof = Bytes::from(decode_hex("input_proof", &response.input_proof)?);

        Ok(EncryptedPayload {
            handles,
            input_proof,
        })
    }

    async fn generate_keypair(&self) -> Result<KeyPair, EncryptionError> {
        self.client.post(&self.path("keypair"), &json!({})).await
    }

    async fn create_eip712(
        &self,
        public_key: &str,
        contracts: &[Address],
        window: DecryptionWindow,
    ) -> Result<TypedData, EncryptionError> {
        let body = json!({
            "public_key": public_key,
            "contract_addresses": contracts,
            "start_timestamp": window.start_timestamp,
            "duration_days": window.duration_days,
        });
        self.client.post(&self.path("eip712"), &body).await
    }

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<HashMap<B256, String>, EncryptionError> {
        let handles: Vec<_> = request
            .handles
            .iter()
            .map(|pair| {
                json!({
                    "handle": pair.handle,
                    "contract_address": pair.contract_address,
                })
            })
            .collect();

        let body = json!({
            "handles": handles,
            "private_key": request.keypair.private_key,
            "public_key": request.keypair.public_key,
            "signature": hex::encode_prefixed(request.signature.as_bytes()),
            "contract_addresses": request.contract_addresses,
            "user_address": request.user_address,
            "start_timestamp": request.window.start_timestamp,
            "duration_days": request.window.duration_days,
        });
        let response: DecryptResponse = self.client.post(&self.path("user-decrypt"), &body).await?;

        response
            .results
            .iter()
            .map(|(handle, value)| -> Result<(B256, String), EncryptionError> {
                Ok((decode_handle(handle)?, render_value(value)))
            })
            .collect()
    }
}
