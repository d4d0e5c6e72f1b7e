//! The relay submission boundary.
//!
//! [`RelayCoordinator`] accepts signed authorization payloads from untrusted
//! submitters, forwards them to the wallet executor as one execution unit,
//! and returns a receipt. It performs no validation of its own: the protocol
//! stays safe even if this component is bypassed entirely, because every
//! check lives inside [`WalletExecutor`].

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{
    authorization::Authorization, error::ExecutionError, executor::WalletExecutor,
    factory::WalletFactory, ledger::Ledger,
};

/// A signed authorization payload as submitted over the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// The wallet owner identity; the wallet address is derived from it.
    pub owner: Address,
    /// The call target.
    pub target: Address,
    /// Opaque calldata for the target.
    pub call_data: Bytes,
    /// Native currency sent with the call.
    pub native_value: U256,
    /// Fee asset (wallet address for native, token address otherwise).
    pub fee_asset: Address,
    /// Fee paid to the relayer.
    pub fee_amount: U256,
    /// Last timestamp (inclusive) at which the authorization may execute.
    pub expiry: U256,
    /// The wallet nonce this authorization is pinned to.
    pub nonce: U256,
    /// 65-byte `r ‖ s ‖ v` owner signature over the authorization digest.
    pub signature: Bytes,
}

impl RelayRequest {
    /// The authorization tuple carried by this request.
    pub fn authorization(&self) -> Authorization {
        Authorization {
            target: self.target,
            call_data: self.call_data.clone(),
            native_value: self.native_value,
            fee_asset: self.fee_asset,
            fee_amount: self.fee_amount,
            expiry: self.expiry,
        }
    }

    /// The submission identifier: `keccak256` over the wallet address, the
    /// canonical authorization encoding, the nonce and the signature.
    pub fn transaction_id(&self, wallet: Address) -> B256 {
        let encoded = self.authorization().encode();
        let mut buf =
            Vec::with_capacity(Address::len_bytes() + encoded.len() + 32 + self.signature.len());
        buf.extend_from_slice(wallet.as_slice());
        buf.extend_from_slice(&encoded);
        buf.extend_from_slice(&self.nonce.to_be_bytes::<32>());
        buf.extend_from_slice(&self.signature);
        keccak256(&buf)
    }
}

/// The receipt returned to a submitter for an executed authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// The submission identifier.
    pub transaction_id: B256,
    /// The wallet that executed the call.
    pub wallet: Address,
    /// The nonce the authorization consumed.
    pub nonce: U256,
    /// Whether this submission deployed the wallet.
    pub deployed: bool,
    /// The target call's return data.
    pub output: Bytes,
}

/// Accepts signed authorizations and relays them to the wallet executor.
#[derive(Debug)]
pub struct RelayCoordinator {
    ledger: Ledger,
    factory: WalletFactory,
    relayer: Address,
}

impl RelayCoordinator {
    /// Creates a coordinator collecting fees at `relayer`.
    pub fn new(ledger: Ledger, factory: WalletFactory, relayer: Address) -> Self {
        Self { ledger, factory, relayer }
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the ledger, for seeding and time control.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// The wallet factory this coordinator deploys through.
    pub fn factory(&self) -> &WalletFactory {
        &self.factory
    }

    /// The address relay fees accrue to.
    pub fn relayer(&self) -> Address {
        self.relayer
    }

    /// The wallet address a request routes to.
    pub fn wallet_address(&self, owner: Address) -> Address {
        self.factory.derive_wallet_address(owner)
    }

    /// Relays one signed authorization.
    ///
    /// Runs the deployment-with-first-call or direct-call path as a single
    /// execution unit and reports the outcome synchronously. A rejected
    /// submission has zero ledger-visible effects.
    pub fn relay(&mut self, request: &RelayRequest) -> Result<ExecutionReceipt, ExecutionError> {
        let auth = request.authorization();
        let factory = &self.factory;
        let relayer = self.relayer;
        let summary = self.ledger.execute_unit(|state| {
            WalletExecutor::new(state, factory).execute(
                request.owner,
                &auth,
                request.nonce,
                &request.signature,
                relayer,
            )
        })?;
        Ok(ExecutionReceipt {
            transaction_id: request.transaction_id(summary.wallet),
            wallet: summary.wallet,
            nonce: request.nonce,
            deployed: summary.deployed,
            output: summary.output,
        })
    }
}
