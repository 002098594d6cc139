//! Collaborator boundaries of the broadcast job.

use async_trait::async_trait;
use bitcoin::{opcodes::all::OP_PUSHBYTES_0, script::Builder, script::PushBytesBuf, ScriptBuf, Transaction};
use pegbridge_primitives::prelude::*;
use pegbridge_tracker_types::TrackerName;
use pegbridge_txs::RawTx;

use crate::errors::BroadcastError;

/// Per-chain driver for turning a pending custody transaction into an
/// on-chain broadcast.
#[async_trait]
pub trait ChainDriver: Send + Sync + 'static {
    /// Decodes a raw external transaction.
    fn decode_tx(&self, raw: &RawExternalTx) -> Result<Transaction, BroadcastError>;

    /// Attaches the assembled spending script to the pending transaction.
    fn attach_spend_script(
        &self,
        raw: &RawExternalTx,
        script: ScriptBuf,
    ) -> Result<Transaction, BroadcastError>;

    /// Pushes the finalized transaction to the external chain.
    async fn broadcast(&self, tx: &Transaction) -> Result<ExternalTxid, BroadcastError>;
}

/// Resolves the locking script guarding a tracker's custody output.
pub trait LockScriptProvider: Send + Sync + 'static {
    fn lock_script(&self, tracker: &TrackerName) -> Option<Vec<u8>>;
}

/// Re-injects a fully-formed internal transaction into the ledger pipeline.
#[async_trait]
pub trait InternalBroadcaster: Send + Sync + 'static {
    async fn submit(&self, tx: RawTx) -> Result<(), BroadcastError>;
}

/// Builds the spending script: the collected signatures in participant-index
/// order behind the leading multisig dummy, followed by the lock script.
pub fn assemble_spend_script(
    signatures: &[(u32, &[u8])],
    lock_script: &[u8],
) -> Result<ScriptBuf, BroadcastError> {
    let mut builder = Builder::new().push_opcode(OP_PUSHBYTES_0);
    for (idx, sig) in signatures {
        let push = PushBytesBuf::try_from(sig.to_vec())
            .map_err(|_| BroadcastError::Script(format!("signature {idx} exceeds push limit")))?;
        builder = builder.push_slice(push);
    }
    let lock_push = PushBytesBuf::try_from(lock_script.to_vec())
        .map_err(|_| BroadcastError::Script("lock script exceeds push limit".to_owned()))?;
    builder = builder.push_slice(lock_push);
    Ok(builder.into_script())
}

/// Reference [`ChainDriver`] codec half for the Bitcoin transaction model.
///
/// Decoding and script attachment are chain-format concerns implemented
/// directly against the external chain's consensus encoding; the broadcast
/// endpoint itself stays behind the trait.
pub fn decode_external_tx(raw: &RawExternalTx) -> Result<Transaction, BroadcastError> {
    raw.try_into()
        .map_err(|e: bitcoin::consensus::encode::Error| BroadcastError::Decode(e.to_string()))
}

/// Attaches the spending script to the first input of the pending
/// transaction.
pub fn attach_script_to_first_input(
    raw: &RawExternalTx,
    script: ScriptBuf,
) -> Result<Transaction, BroadcastError> {
    let mut tx = decode_external_tx(raw)?;
    let input = tx
        .input
        .first_mut()
        .ok_or_else(|| BroadcastError::Decode("pending transaction has no inputs".to_owned()))?;
    input.script_sig = script;
    Ok(tx)
}
