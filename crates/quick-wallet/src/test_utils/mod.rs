//! Utilities for testing the wallet relay protocol.

use alloy_primitives::{address, bytes, keccak256, map::HashMap, Address, Bytes, B256, U256};
use alloy_sol_types::{SolInterface, SolValue};
use k256::ecdsa::SigningKey;

use crate::{
    authorization::{authorization_digest, signing_hash, Authorization},
    contract::{CallContext, CallOutcome, ContractCode},
    factory::WalletFactory,
    relay::RelayRequest,
    settlement::IERC20,
};

/// A deterministic secp256k1 signer for tests.
#[derive(Debug, Clone)]
pub struct TestSigner {
    key: SigningKey,
}

impl TestSigner {
    /// Creates a signer from a tiny deterministic seed. The seed must be
    /// non-zero (zero is not a valid scalar).
    pub fn new(seed: u8) -> Self {
        assert_ne!(seed, 0, "seed must be a valid non-zero scalar");
        let mut bytes = [0u8; 32];
        bytes[31] = seed;
        let key = SigningKey::from_slice(&bytes).expect("non-zero seed is a valid scalar");
        Self { key }
    }

    /// The address corresponding to the signing key.
    pub fn address(&self) -> Address {
        let point = self.key.verifying_key().to_encoded_point(false);
        Address::from_slice(&keccak256(&point.as_bytes()[1..])[12..])
    }

    /// Signs an authorization digest `eth_sign`-style, returning the 65-byte
    /// `r ‖ s ‖ v` signature with `v` in `{27, 28}`.
    pub fn sign_digest(&self, digest: B256) -> Bytes {
        let message_hash = signing_hash(digest);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(message_hash.as_slice())
            .expect("signing cannot fail for a valid key");
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Bytes::copy_from_slice(&out)
    }
}

/// An ERC20 mock implementing the token collaborator interface.
///
/// `transfer` debits the caller and reverts on insufficient balance, the way
/// a well-behaved token does.
#[derive(Debug, Clone, Default)]
pub struct TokenContract {
    balances: HashMap<Address, U256>,
}

impl TokenContract {
    /// Creates a token with no balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a holder balance.
    pub fn with_balance(mut self, holder: Address, amount: U256) -> Self {
        self.balances.insert(holder, amount);
        self
    }

    fn balance(&self, holder: Address) -> U256 {
        self.balances.get(&holder).copied().unwrap_or(U256::ZERO)
    }
}

impl ContractCode for TokenContract {
    fn call(&mut self, ctx: &CallContext, input: &[u8]) -> CallOutcome {
        match IERC20::IERC20Calls::abi_decode(input, true) {
            Ok(IERC20::IERC20Calls::transfer(call)) => {
                let available = self.balance(ctx.caller);
                if available < call.value {
                    return CallOutcome::Revert { output: Bytes::new() };
                }
                self.balances.insert(ctx.caller, available - call.value);
                let to_balance = self.balance(call.to);
                self.balances.insert(call.to, to_balance + call.value);
                CallOutcome::Success { output: true.abi_encode().into() }
            }
            Ok(IERC20::IERC20Calls::balanceOf(call)) => {
                CallOutcome::Success { output: self.balance(call.owner).abi_encode().into() }
            }
            Err(_) => CallOutcome::Revert { output: Bytes::new() },
        }
    }

    fn clone_box(&self) -> Box<dyn ContractCode> {
        Box::new(self.clone())
    }
}

/// A contract that accepts any call and counts what it received.
#[derive(Debug, Clone, Default)]
pub struct Receiver {
    calls: u64,
    total_received: U256,
}

impl Receiver {
    /// Creates a fresh receiver.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many calls the receiver has seen.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Total native value received across calls.
    pub fn total_received(&self) -> U256 {
        self.total_received
    }
}

impl ContractCode for Receiver {
    fn call(&mut self, ctx: &CallContext, _input: &[u8]) -> CallOutcome {
        self.calls += 1;
        self.total_received += ctx.value;
        CallOutcome::empty()
    }

    fn clone_box(&self) -> Box<dyn ContractCode> {
        Box::new(self.clone())
    }
}

/// A contract that reverts every call.
#[derive(Debug, Clone, Copy)]
pub struct RevertingReceiver;

impl ContractCode for RevertingReceiver {
    fn call(&mut self, _ctx: &CallContext, _input: &[u8]) -> CallOutcome {
        CallOutcome::Revert { output: Bytes::new() }
    }

    fn clone_box(&self) -> Box<dyn ContractCode> {
        Box::new(*self)
    }
}

/// A factory with a fixed address and placeholder template code.
pub fn test_factory() -> WalletFactory {
    WalletFactory::new(
        address!("00000000000000000000000000000000000000fa"),
        bytes!("6080604052600a600c"),
    )
}

/// Builds a fully signed relay request for `signer`'s wallet.
pub fn signed_request(
    signer: &TestSigner,
    factory: &WalletFactory,
    auth: &Authorization,
    nonce: U256,
) -> RelayRequest {
    let wallet = factory.derive_wallet_address(signer.address());
    let digest = authorization_digest(wallet, &auth.encode(), nonce);
    RelayRequest {
        owner: signer.address(),
        target: auth.target,
        call_data: auth.call_data.clone(),
        native_value: auth.native_value,
        fee_asset: auth.fee_asset,
        fee_amount: auth.fee_amount,
        expiry: auth.expiry,
        nonce,
        signature: signer.sign_digest(digest),
    }
}

/// Encodes an ERC20 `transfer(to, value)` call.
pub fn encode_transfer(to: Address, value: U256) -> Bytes {
    use alloy_sol_types::SolCall;
    IERC20::transferCall { to, value }.abi_encode().into()
}
