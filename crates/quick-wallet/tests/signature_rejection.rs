//! Authorization integrity: a signature covers every field of the intent,
//! the wallet address and the nonce, so nothing can be altered in flight.

use alloy_primitives::{address, Address, Bytes, U256};
use quick_wallet::{
    test_utils::{signed_request, test_factory, TestSigner},
    Authorization, ExecutionError, Ledger, RelayCoordinator,
};

const RELAYER: Address = address!("00000000000000000000000000000000000000ee");
const OTHER: Address = address!("0000000000000000000000000000000000009090");

const NOW: u64 = 1_000;

fn coordinator() -> RelayCoordinator {
    let mut ledger = Ledger::new();
    ledger.set_timestamp(NOW);
    RelayCoordinator::new(ledger, test_factory(), RELAYER)
}

fn funded_transfer(coordinator: &mut RelayCoordinator, owner: &TestSigner) -> Authorization {
    let wallet = coordinator.wallet_address(owner.address());
    coordinator.ledger_mut().set_balance(wallet, U256::from(100));
    Authorization {
        target: OTHER,
        call_data: Bytes::new(),
        native_value: U256::from(10),
        fee_asset: wallet,
        fee_amount: U256::from(1),
        expiry: U256::from(NOW + 60),
    }
}

#[test]
fn non_owner_signature_is_rejected() {
    let mut coordinator = coordinator();
    let owner = TestSigner::new(1);
    let intruder = TestSigner::new(2);
    let auth = funded_transfer(&mut coordinator, &owner);

    // signed by the intruder but submitted against the owner's wallet
    let mut request = signed_request(&intruder, coordinator.factory(), &auth, U256::ZERO);
    request.owner = owner.address();

    assert_eq!(coordinator.relay(&request), Err(ExecutionError::InvalidSignature));
    assert!(coordinator.ledger().wallet(coordinator.wallet_address(owner.address())).is_none());
}

#[test]
fn relayer_cannot_raise_its_own_fee() {
    let mut coordinator = coordinator();
    let owner = TestSigner::new(1);
    let auth = funded_transfer(&mut coordinator, &owner);

    let mut request = signed_request(&owner, coordinator.factory(), &auth, U256::ZERO);
    request.fee_amount += U256::from(1);

    assert_eq!(coordinator.relay(&request), Err(ExecutionError::InvalidSignature));
    assert_eq!(coordinator.ledger().balance(RELAYER), U256::ZERO);
}

#[test]
fn relayer_cannot_redirect_the_call() {
    let mut coordinator = coordinator();
    let owner = TestSigner::new(1);
    let auth = funded_transfer(&mut coordinator, &owner);

    let mut request = signed_request(&owner, coordinator.factory(), &auth, U256::ZERO);
    request.target = address!("0000000000000000000000000000000000004444");

    assert_eq!(coordinator.relay(&request), Err(ExecutionError::InvalidSignature));
}

#[test]
fn garbage_signatures_are_rejected() {
    let mut coordinator = coordinator();
    let owner = TestSigner::new(1);
    let auth = funded_transfer(&mut coordinator, &owner);

    let mut request = signed_request(&owner, coordinator.factory(), &auth, U256::ZERO);
    request.signature = Bytes::from_static(&[0x42; 65]);
    assert_eq!(coordinator.relay(&request), Err(ExecutionError::InvalidSignature));

    request.signature = Bytes::from_static(&[0x42; 12]);
    assert_eq!(coordinator.relay(&request), Err(ExecutionError::InvalidSignature));
}

#[test]
fn signature_for_one_wallet_does_not_authorize_another() {
    let mut coordinator = coordinator();
    let alice = TestSigner::new(1);
    let bob = TestSigner::new(2);

    let alice_wallet = coordinator.wallet_address(alice.address());
    let bob_wallet = coordinator.wallet_address(bob.address());
    coordinator.ledger_mut().set_balance(alice_wallet, U256::from(100));
    coordinator.ledger_mut().set_balance(bob_wallet, U256::from(100));

    let auth = Authorization {
        target: OTHER,
        call_data: Bytes::new(),
        native_value: U256::from(10),
        fee_asset: bob_wallet,
        fee_amount: U256::from(1),
        expiry: U256::from(NOW + 60),
    };

    // alice's signature over her own wallet digest, replayed as if bob
    // had authorized the same intent
    let alice_request = signed_request(&alice, coordinator.factory(), &auth, U256::ZERO);
    let mut cross = alice_request;
    cross.owner = bob.address();

    assert_eq!(coordinator.relay(&cross), Err(ExecutionError::InvalidSignature));
    assert_eq!(coordinator.ledger().balance(bob_wallet), U256::from(100));
}
