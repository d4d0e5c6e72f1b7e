//! ECDSA signature recovery for authorization digests.
//!
//! Signatures are the 65-byte `r ‖ s ‖ v` layout produced by `eth_sign`,
//! with `v` equal to 27 or 28. Recovery runs over the EIP-191 wrap of the
//! authorization digest (see [`signing_hash`]) and derives the signer
//! address as `keccak256(uncompressed_pubkey[1..])[12..]`.
//!
//! The recovered identity is an opaque comparable value: callers only ever
//! compare it against the expected wallet owner.

use alloy_primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::{authorization::signing_hash, error::ExecutionError};

/// Length of an `r ‖ s ‖ v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recovers the signer address of an authorization digest.
///
/// Fails with [`ExecutionError::InvalidSignature`] on a malformed signature
/// (wrong length, `v` outside `{27, 28}`, non-canonical `r`/`s`), on failed
/// recovery, or when recovery produces the zero address.
pub fn recover_signer(digest: B256, signature: &[u8]) -> Result<Address, ExecutionError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(ExecutionError::InvalidSignature);
    }

    let v = signature[64];
    if v != 27 && v != 28 {
        return Err(ExecutionError::InvalidSignature);
    }
    let recovery_id =
        RecoveryId::try_from(v - 27).map_err(|_| ExecutionError::InvalidSignature)?;
    let signature =
        Signature::from_slice(&signature[..64]).map_err(|_| ExecutionError::InvalidSignature)?;

    let message_hash = signing_hash(digest);
    let recovered_key =
        VerifyingKey::recover_from_prehash(message_hash.as_slice(), &signature, recovery_id)
            .map_err(|_| ExecutionError::InvalidSignature)?;

    // Uncompressed point is 0x04 ‖ x ‖ y; the address is the trailing 20
    // bytes of keccak256(x ‖ y).
    let pubkey_point = recovered_key.to_encoded_point(false);
    let pubkey_hash = keccak256(&pubkey_point.as_bytes()[1..]);
    let signer = Address::from_slice(&pubkey_hash[12..]);

    if signer.is_zero() {
        return Err(ExecutionError::InvalidSignature);
    }
    Ok(signer)
}

/// Checks that a signature over `digest` recovers to `expected_owner`.
pub fn verify_owner(
    digest: B256,
    signature: &[u8],
    expected_owner: Address,
) -> Result<(), ExecutionError> {
    let signer = recover_signer(digest, signature)?;
    if signer != expected_owner {
        return Err(ExecutionError::InvalidSignature);
    }
    Ok(())
}
