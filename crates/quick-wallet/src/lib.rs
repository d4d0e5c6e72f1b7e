//! Counterfactual wallet and meta-transaction relay protocol.
//!
//! A wallet owner authorizes transactions off-chain by signing a digest over
//! the intent tuple, the wallet address and the wallet's current nonce; an
//! untrusted relayer submits the authorization, pays for its execution and
//! recoups the cost through a fee in native currency or a token. The wallet
//! itself may not exist yet at signing time: its address is derived
//! deterministically, so it can be funded first and deployed together with
//! its first call.
//!
//! The crate is organized around the protocol's trust boundary: everything
//! security-relevant (byte-exact encoding, signature recovery, nonce replay
//! protection, atomic fee settlement) lives in the executor path, while the
//! [`RelayCoordinator`] boundary performs no validation at all.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod authorization;
pub use authorization::*;

mod contract;
pub use contract::*;

mod error;
pub use error::*;

mod executor;
pub use executor::*;

mod factory;
pub use factory::*;

mod ledger;
pub use ledger::*;

mod relay;
pub use relay::*;

mod settlement;
pub use settlement::*;

mod signature;
pub use signature::*;

mod wallet;
pub use wallet::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
