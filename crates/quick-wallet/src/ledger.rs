//! The sequential, atomic execution environment.
//!
//! [`Ledger`] models the deterministic ledger the protocol assumes: native
//! balances, wallet accounts, installed contract code and a block timestamp,
//! processed one execution unit at a time.
//!
//! # Execution units
//!
//! [`Ledger::execute_unit`] runs a closure against a scratch copy of the
//! state and installs the scratch only if the closure succeeds. A failing
//! unit therefore has zero observable effects, which gives the protocol its
//! all-or-nothing grouping of target call, fee transfer and nonce advance.
//! Because units run behind a `&mut` receiver they are serialized; racing
//! submitters are decided by the nonce check *inside* the unit, never by an
//! outer lock.

use alloy_primitives::{map::HashMap, Address, Bytes, U256};

use crate::{
    contract::{CallContext, CallOutcome, ContractCode},
    error::ExecutionError,
    wallet::WalletAccount,
};

/// The mutable ledger state an execution unit operates on.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    timestamp: u64,
    balances: HashMap<Address, U256>,
    wallets: HashMap<Address, WalletAccount>,
    contracts: HashMap<Address, Box<dyn ContractCode>>,
}

impl LedgerState {
    /// The current ledger timestamp in seconds.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Sets the ledger timestamp.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// Moves the ledger timestamp forward.
    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp += seconds;
    }

    /// The native balance of an account. Unknown accounts hold zero.
    pub fn balance(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or(U256::ZERO)
    }

    /// Sets the native balance of an account. Genesis/setup use; everything
    /// inside the protocol moves value through [`Self::transfer_native`].
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.balances.insert(address, balance);
    }

    /// Moves native currency between accounts.
    pub fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ExecutionError> {
        let available = self.balance(from);
        if available < amount {
            return Err(ExecutionError::InsufficientBalance { needed: amount, available });
        }
        self.balances.insert(from, available - amount);
        let to_balance = self.balance(to);
        self.balances.insert(to, to_balance + amount);
        Ok(())
    }

    /// Installs contract code at an address.
    pub fn install_contract(&mut self, address: Address, code: Box<dyn ContractCode>) {
        self.contracts.insert(address, code);
    }

    /// Whether any contract or wallet occupies the address.
    pub fn is_occupied(&self, address: Address) -> bool {
        self.contracts.contains_key(&address) || self.wallets.contains_key(&address)
    }

    /// The wallet account at an address, if one is deployed.
    pub fn wallet(&self, address: Address) -> Option<&WalletAccount> {
        self.wallets.get(&address)
    }

    pub(crate) fn wallet_mut(&mut self, address: Address) -> Option<&mut WalletAccount> {
        self.wallets.get_mut(&address)
    }

    pub(crate) fn create_wallet(&mut self, address: Address, owner: Address) {
        self.wallets.insert(address, WalletAccount::new(owner));
    }

    /// Forwards a call to `target`, moving `value` first.
    ///
    /// Calls to addresses without code are plain transfers and succeed with
    /// empty output. The value transfer happens before the code runs; a
    /// reverting outcome is only ever surfaced inside an execution unit that
    /// aborts on it, so the intermediate credit never survives a revert.
    pub fn invoke(
        &mut self,
        caller: Address,
        target: Address,
        input: &[u8],
        value: U256,
    ) -> Result<CallOutcome, ExecutionError> {
        if !value.is_zero() {
            self.transfer_native(caller, target, value)?;
        }
        let Some(mut code) = self.contracts.remove(&target) else {
            return Ok(CallOutcome::empty());
        };
        let ctx = CallContext { caller, contract: target, value };
        let outcome = code.call(&ctx, input);
        self.contracts.insert(target, code);
        Ok(outcome)
    }
}

/// The ledger, processing execution units sequentially.
///
/// Derefs to the committed [`LedgerState`] for reads and for genesis/test
/// seeding; protocol effects go through [`Self::execute_unit`].
#[derive(Debug, Clone, Default, derive_more::Deref, derive_more::DerefMut)]
pub struct Ledger {
    #[deref]
    #[deref_mut]
    state: LedgerState,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one atomic execution unit.
    ///
    /// The closure operates on a scratch copy of the state; the scratch
    /// replaces the committed state only when the closure returns `Ok`.
    pub fn execute_unit<T>(
        &mut self,
        unit: impl FnOnce(&mut LedgerState) -> Result<T, ExecutionError>,
    ) -> Result<T, ExecutionError> {
        let mut scratch = self.state.clone();
        let value = unit(&mut scratch)?;
        self.state = scratch;
        Ok(value)
    }

    /// Submits a plain call as its own execution unit.
    ///
    /// A revert aborts the unit, so the attached value moves only if the
    /// call succeeds.
    pub fn call(
        &mut self,
        caller: Address,
        target: Address,
        input: &[u8],
        value: U256,
    ) -> Result<Bytes, ExecutionError> {
        self.execute_unit(|state| match state.invoke(caller, target, input, value)? {
            CallOutcome::Success { output } => Ok(output),
            CallOutcome::Revert { output } => Err(ExecutionError::TargetCallFailed { output }),
        })
    }
}
