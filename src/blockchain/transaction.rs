//! Transaction inclusion monitoring.

use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::Ledger;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxReceipt};

/// Floor for polling periods; `interval` rejects a zero period.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Poll for a transaction receipt until it appears or `max_wait` elapses.
///
/// A reverted transaction is returned as a receipt with `success == false`;
/// deciding what that means is up to the caller.
pub async fn wait_for_receipt(
    ledger: &dyn Ledger,
    tx_hash: TxHash,
    poll_interval: Duration,
    max_wait: Duration,
) -> BlockchainResult<TxReceipt> {
    let result = timeout(max_wait, async {
        let mut ticker = interval(poll_interval.max(MIN_POLL_INTERVAL));

        loop {
            ticker.tick().await;

            match ledger.get_receipt(tx_hash).await? {
                Some(receipt) => {
                    tracing::debug!(
                        tx_hash = %tx_hash,
                        block_number = ?receipt.block_number,
                        success = receipt.success,
                        "Transaction included"
                    );
                    return Ok::<_, BlockchainError>(receipt);
                }
                None => tracing::debug!(tx_hash = %tx_hash, "Transaction pending"),
            }
        }
    })
    .await;

    match result {
        Ok(receipt) => receipt,
        Err(_) => Err(BlockchainError::ConfirmationTimeout(tx_hash, max_wait.as_secs())),
    }
}
