//! Calldata for the token's write path.

use alloy::primitives::{Address, Bytes, B256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    /// Wire shape of the token's transfer entry point.
    interface IConfidentialToken {
        function transfer(address to, bytes32 amount, bytes proof) external returns (bool);
    }
}

/// Encode `transfer(to, handle, proof)` against the fixed wire signature.
pub fn encode_transfer(to: Address, handle: B256, proof: Bytes) -> Bytes {
    IConfidentialToken::transferCall {
        to,
        amount: handle,
        proof,
    }
    .abi_encode()
    .into()
}
