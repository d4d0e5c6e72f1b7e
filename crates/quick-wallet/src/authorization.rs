//! The authorization wire format and its signing digest.
//!
//! An [`Authorization`] is the off-chain-signed statement describing one
//! intended wallet transaction together with its relay fee and expiry. The
//! byte encoding produced here is a wire-format contract shared between the
//! off-chain signer and the executor: any change in field order or width
//! invalidates every previously issued signature.
//!
//! # Encoding
//!
//! The canonical encoding is the ABI parameter encoding of the tuple
//! `(address target, bytes callData, uint256 value, address feeAsset,
//! uint256 feeAmount, uint256 expiry)`. The `bytes` field is offset- and
//! length-delimited by the ABI head/tail scheme, so two distinct
//! authorizations can never share an encoding.
//!
//! # Digest
//!
//! The digest that gets signed is
//! `keccak256(walletAddress ‖ encoding ‖ nonce)` with the nonce as a 32-byte
//! big-endian word. Binding the wallet address prevents cross-wallet replay;
//! binding the exact nonce pins the authorization to a single position in the
//! wallet's history, so it can be consumed at most once and only in order.
//!
//! Signers produce an `eth_sign`-style signature, so verification happens
//! over the EIP-191 personal-message wrap of the digest, see
//! [`signing_hash`].

use alloy_primitives::{keccak256, utils::eip191_hash_message, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// The ABI tuple underlying the authorization encoding.
type AuthorizationTuple = (Address, Bytes, U256, Address, U256, U256);

/// A transaction intent authorized by a wallet owner.
///
/// The wallet address and the nonce are deliberately not part of the struct:
/// they are supplied at digest time, because the same intent tuple is
/// meaningless without the wallet/nonce pair it was signed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// The call target.
    pub target: Address,
    /// The opaque calldata forwarded to the target.
    pub call_data: Bytes,
    /// Native currency sent along with the call.
    pub native_value: U256,
    /// Fee asset: the wallet's own address means native currency, anything
    /// else is treated as a token contract address.
    pub fee_asset: Address,
    /// Fee paid to the relayer on successful execution.
    pub fee_amount: U256,
    /// Last timestamp (inclusive) at which the authorization may execute.
    pub expiry: U256,
}

impl Authorization {
    /// Encodes the authorization into its canonical byte representation.
    pub fn encode(&self) -> Bytes {
        (
            self.target,
            self.call_data.clone(),
            self.native_value,
            self.fee_asset,
            self.fee_amount,
            self.expiry,
        )
            .abi_encode_params()
            .into()
    }

    /// Decodes an authorization from its canonical byte representation.
    pub fn decode(data: &[u8]) -> alloy_sol_types::Result<Self> {
        let (target, call_data, native_value, fee_asset, fee_amount, expiry) =
            AuthorizationTuple::abi_decode_params(data, true)?;
        Ok(Self { target, call_data, native_value, fee_asset, fee_amount, expiry })
    }
}

/// Computes the digest a wallet owner signs for one authorization.
///
/// `keccak256(wallet ‖ encoded ‖ nonce_be32)` — the tightly packed hash over
/// the wallet address, the canonical encoding, and the 32-byte big-endian
/// nonce.
pub fn authorization_digest(wallet: Address, encoded: &[u8], nonce: U256) -> B256 {
    let mut buf = Vec::with_capacity(Address::len_bytes() + encoded.len() + 32);
    buf.extend_from_slice(wallet.as_slice());
    buf.extend_from_slice(encoded);
    buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    keccak256(&buf)
}

/// The EIP-191 personal-message hash of an authorization digest.
///
/// Owners sign with `eth_sign` semantics, i.e. over
/// `"\x19Ethereum Signed Message:\n32" ‖ digest`.
pub fn signing_hash(digest: B256) -> B256 {
    eip191_hash_message(digest)
}
