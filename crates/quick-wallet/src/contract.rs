//! The opaque-call capability targets expose to the executor.
//!
//! The wallet executor never interprets a target's interface: it forwards
//! calldata bytes together with a native value and observes success or
//! revert. Anything installed in the ledger that wants to react to calls
//! implements [`ContractCode`].

use alloy_primitives::{Address, Bytes, U256};
use core::fmt;

/// The call frame a contract observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The account the call originates from.
    pub caller: Address,
    /// The address the contract itself is installed at.
    pub contract: Address,
    /// Native value attached to the call. Already credited to the contract's
    /// balance when `call` runs.
    pub value: U256,
}

/// Result of forwarding calldata to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call completed; `output` is the returned data.
    Success {
        /// Returned data
        output: Bytes,
    },
    /// The call reverted; `output` is the revert data.
    Revert {
        /// Revert data
        output: Bytes,
    },
}

impl CallOutcome {
    /// A successful outcome with no return data.
    pub fn empty() -> Self {
        Self::Success { output: Bytes::new() }
    }

    /// Whether the call completed without reverting.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Executable code installed at a ledger address.
///
/// Implementations own their internal storage; the ledger clones them
/// together with the rest of the state when an execution unit starts, which
/// is what makes unit rollback cover contract storage as well.
pub trait ContractCode: fmt::Debug + Send {
    /// Handles a call forwarded by the ledger.
    fn call(&mut self, ctx: &CallContext, input: &[u8]) -> CallOutcome;

    /// Clones the code including its internal storage.
    fn clone_box(&self) -> Box<dyn ContractCode>;
}

impl Clone for Box<dyn ContractCode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
