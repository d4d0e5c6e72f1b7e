//! Deterministic wallet address derivation and deployment.
//!
//! A wallet's address is a pure function of the factory identity, the owner
//! identity and the wallet template code, so owners can receive funds before
//! the wallet exists. The template code is fixed once at factory
//! construction and identical for every wallet; per-wallet specialization
//! comes only from the owner address baked into the deployment salt and
//! init data. The real deployment must land on exactly the derived address.

use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_sol_types::SolValue;

use crate::{error::ExecutionError, ledger::LedgerState};

/// The factory that deploys counterfactual wallets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletFactory {
    address: Address,
    wallet_code: Bytes,
}

impl WalletFactory {
    /// Creates a factory at `address` deploying the given wallet template.
    pub fn new(address: Address, wallet_code: Bytes) -> Self {
        Self { address, wallet_code }
    }

    /// The factory's own address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The wallet template code shared by every deployed wallet.
    pub fn wallet_code(&self) -> &Bytes {
        &self.wallet_code
    }

    /// The deployment salt for an owner: `keccak256(owner)` over the packed
    /// 20-byte address.
    pub fn salt_for(&self, owner: Address) -> B256 {
        keccak256(owner.as_slice())
    }

    /// The init code for an owner: template code followed by the ABI-encoded
    /// owner address.
    pub fn init_code_for(&self, owner: Address) -> Bytes {
        let mut init_code = self.wallet_code.to_vec();
        init_code.extend_from_slice(&owner.abi_encode());
        init_code.into()
    }

    /// Derives the wallet address for an owner.
    ///
    /// Pure: `CREATE2(factory, keccak256(owner), wallet_code ‖ encode(owner))`,
    /// i.e. `keccak256(0xff ‖ factory ‖ salt ‖ keccak256(init_code))[12..]`.
    pub fn derive_wallet_address(&self, owner: Address) -> Address {
        self.address.create2_from_code(self.salt_for(owner), self.init_code_for(owner))
    }

    /// Deploys the wallet for `owner` at its derived address with nonce 0.
    ///
    /// Fails with [`ExecutionError::AlreadyDeployed`] if anything occupies
    /// the derived address. The failure is fatal and never retried.
    pub fn deploy(
        &self,
        state: &mut LedgerState,
        owner: Address,
    ) -> Result<Address, ExecutionError> {
        let address = self.derive_wallet_address(owner);
        if state.is_occupied(address) {
            return Err(ExecutionError::AlreadyDeployed { address });
        }
        state.create_wallet(address, owner);
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RevertingReceiver;
    use alloy_primitives::{address, bytes, U256};

    const FACTORY: Address = address!("00000000000000000000000000000000000000fa");
    const OWNER: Address = address!("0000000000000000000000000000000000000111");

    fn factory() -> WalletFactory {
        WalletFactory::new(FACTORY, bytes!("60806040deadbeef"))
    }

    #[test]
    fn derivation_is_deterministic() {
        let factory = factory();
        assert_eq!(factory.derive_wallet_address(OWNER), factory.derive_wallet_address(OWNER));
    }

    #[test]
    fn derivation_matches_create2_over_init_code_hash() {
        let factory = factory();
        let expected = FACTORY
            .create2(factory.salt_for(OWNER), keccak256(factory.init_code_for(OWNER)));
        assert_eq!(factory.derive_wallet_address(OWNER), expected);
    }

    #[test]
    fn distinct_owners_get_distinct_wallets() {
        let factory = factory();
        let other = address!("0000000000000000000000000000000000000222");
        assert_ne!(factory.derive_wallet_address(OWNER), factory.derive_wallet_address(other));
    }

    #[test]
    fn init_code_appends_padded_owner() {
        let factory = factory();
        let init_code = factory.init_code_for(OWNER);
        assert_eq!(init_code.len(), factory.wallet_code().len() + 32);
        assert!(init_code.starts_with(factory.wallet_code()));
        assert_eq!(&init_code[init_code.len() - 20..], OWNER.as_slice());
    }

    #[test]
    fn deploy_lands_on_the_derived_address() {
        let factory = factory();
        let mut state = LedgerState::default();
        let address = factory.deploy(&mut state, OWNER).expect("should deploy");
        assert_eq!(address, factory.derive_wallet_address(OWNER));
        let wallet = state.wallet(address).expect("wallet should exist");
        assert_eq!(wallet.owner(), OWNER);
        assert_eq!(wallet.tx_count(), U256::ZERO);
    }

    #[test]
    fn redeployment_fails_loudly() {
        let factory = factory();
        let mut state = LedgerState::default();
        let address = factory.deploy(&mut state, OWNER).expect("should deploy");
        assert_eq!(
            factory.deploy(&mut state, OWNER),
            Err(ExecutionError::AlreadyDeployed { address })
        );
    }

    #[test]
    fn squatted_address_blocks_deployment() {
        let factory = factory();
        let mut state = LedgerState::default();
        let address = factory.derive_wallet_address(OWNER);
        state.install_contract(address, Box::new(RevertingReceiver));
        assert_eq!(
            factory.deploy(&mut state, OWNER),
            Err(ExecutionError::AlreadyDeployed { address })
        );
    }
}
