// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

#[macro_use]
extern crate lazy_static;

use actor::{
    account, init, ACCOUNT_ACTOR_CODE_ID, FIRST_NON_SINGLETON_ID, INIT_ACTOR_ADDR,
    INIT_ACTOR_CODE_ID, SYSTEM_ACTOR_ADDR, SYSTEM_ACTOR_CODE_ID,
};
use address::Address;
use chain::ChainStore;
use cid::{
    multihash::{Code, MultihashDigest},
    Cid,
};
use db::MemoryDB;
use fvm_ipld_encoding::IPLD_RAW;
use interpreter::{Error, VM};
use ipld_blockstore::{BlockStoreExt, Blockstore, BufferedBlockStore, CancelToken};
use message::{Message, UnsignedMessage};
use runtime::{InvocationContext, StorageExt};
use state_tree::StateTree;
use vm::{
    actor_error, ActorError, ActorState, ExitCode, InvocOutput, Serialized, TokenAmount,
    EMPTY_ARR_BYTES, EMPTY_ARR_CID, METHOD_SEND,
};

type TestStore = BufferedBlockStore<MemoryDB>;

const METHOD_FAIL: u64 = 2;
const METHOD_CHARGE: u64 = 3;
const METHOD_ECHO_SENDER: u64 = 4;
const METHOD_CALL_THROUGH: u64 = 5;
const METHOD_INCREMENT: u64 = 6;
const METHOD_TOUCH_TREE: u64 = 7;
const METHOD_OVERCHARGE: u64 = 8;

lazy_static! {
    static ref PUPPET_CODE: Cid = Cid::new_v1(IPLD_RAW, Code::Identity.digest(b"loam/1/puppet"));
    static ref ALICE: Address = Address::new_key(b"alice pubkey");
    static ref BOB: Address = Address::new_key(b"bob pubkey");
    static ref MINER: Address = Address::new_key(b"miner pubkey");
    static ref PUPPET: Address = Address::new_key(b"puppet actor");
}

// Puppet methods exercising the context surface from inside an invocation.

fn fail_with_return(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<TestStore>,
    _params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    ctx.charge_gas(3u64.into())?;
    Ok(InvocOutput {
        exit_code: ExitCode(7),
        return_data: Serialized::new(vec![0xba, 0xad]),
    })
}

fn charge_four(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<TestStore>,
    _params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    ctx.charge_gas(4u64.into())?;
    Ok(InvocOutput::empty())
}

fn echo_sender(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<TestStore>,
    _params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    let sender = *ctx.message().from();
    Ok(InvocOutput::ok(Serialized::serialize(sender)?))
}

fn call_through(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<TestStore>,
    params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    let (target, method): (Address, u64) = params
        .deserialize()
        .map_err(|e| actor_error!(SYS_ILLEGAL_ARGUMENT; "bad call params: {}", e))?;
    ctx.send(&target, method, TokenAmount::default(), &Serialized::default())
}

fn increment(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<TestStore>,
    _params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    let storage = ctx.storage();
    let head = storage.get_head();
    let counter: u64 = storage.get(&head)?;
    let new_head = storage.put(&(counter + 1))?;
    storage.commit(&head, new_head)?;
    Ok(InvocOutput::ok(Serialized::serialize(counter + 1)?))
}

fn touch_tree(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<TestStore>,
    _params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    ctx.state_tree()?;
    Ok(InvocOutput::empty())
}

fn overcharge(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<TestStore>,
    _params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    ctx.charge_gas(1_000_000u64.into())?;
    Ok(InvocOutput::empty())
}

struct Harness {
    cs: ChainStore<MemoryDB>,
    root: Cid,
}

/// Builds a genesis state with the singleton actors, a miner account, and the
/// given key-class accounts as `(address, balance, nonce)`.
fn setup(accounts: &[(Address, u64, u64)]) -> Harness {
    let cs = ChainStore::new(MemoryDB::default());
    let store = cs.blockstore().clone();
    let mut tree = StateTree::new(store.clone());

    store
        .put_keyed(&EMPTY_ARR_CID, &EMPTY_ARR_BYTES)
        .unwrap();

    tree.set_actor(
        &SYSTEM_ACTOR_ADDR,
        ActorState::new(*SYSTEM_ACTOR_CODE_ID, *EMPTY_ARR_CID, 0u64.into(), 0),
    )
    .unwrap();

    let init_head = store
        .put_obj(
            &init::State::new(
                init::State::empty_map(&store).unwrap(),
                "loam-test".to_owned(),
            ),
            Code::Blake2b256,
        )
        .unwrap();
    tree.set_actor(
        &INIT_ACTOR_ADDR,
        ActorState::new(*INIT_ACTOR_CODE_ID, init_head, 0u64.into(), 0),
    )
    .unwrap();

    let mut install_account = |addr: &Address, balance: u64, nonce: u64| {
        let head = store
            .put_obj(&account::State { address: *addr }, Code::Blake2b256)
            .unwrap();
        tree.set_actor(
            addr,
            ActorState::new(*ACCOUNT_ACTOR_CODE_ID, head, balance.into(), nonce),
        )
        .unwrap();
    };

    install_account(&MINER, 0, 0);
    for (addr, balance, nonce) in accounts {
        install_account(addr, *balance, *nonce);
    }

    // The puppet actor hosts the test methods; its storage is a counter.
    let puppet_head = store.put_obj(&0u64, Code::Blake2b256).unwrap();
    tree.set_actor(
        &PUPPET,
        ActorState::new(*PUPPET_CODE, puppet_head, 0u64.into(), 0),
    )
    .unwrap();

    let root = tree.flush().unwrap();
    Harness { cs, root }
}

fn make_vm(h: &Harness) -> VM<MemoryDB> {
    let mut vm = VM::new(&h.root, 1, *MINER, &h.cs).unwrap();
    vm.register_method(*PUPPET_CODE, METHOD_FAIL, fail_with_return);
    vm.register_method(*PUPPET_CODE, METHOD_CHARGE, charge_four);
    vm.register_method(*PUPPET_CODE, METHOD_ECHO_SENDER, echo_sender);
    vm.register_method(*PUPPET_CODE, METHOD_CALL_THROUGH, call_through);
    vm.register_method(*PUPPET_CODE, METHOD_INCREMENT, increment);
    vm.register_method(*PUPPET_CODE, METHOD_TOUCH_TREE, touch_tree);
    vm.register_method(*PUPPET_CODE, METHOD_OVERCHARGE, overcharge);
    vm
}

fn transfer_msg(from: Address, to: Address, value: u64, nonce: u64) -> UnsignedMessage {
    UnsignedMessage::builder()
        .from(from)
        .to(to)
        .sequence(nonce)
        .value(value.into())
        .method_num(METHOD_SEND)
        .gas_limit(10u64.into())
        .gas_price(1u64.into())
        .build()
        .unwrap()
}

fn call_msg(from: Address, to: Address, method: u64, nonce: u64) -> UnsignedMessage {
    UnsignedMessage::builder()
        .from(from)
        .to(to)
        .sequence(nonce)
        .method_num(method)
        .gas_limit(10u64.into())
        .gas_price(1u64.into())
        .build()
        .unwrap()
}

fn balance(vm: &VM<MemoryDB>, addr: &Address) -> TokenAmount {
    vm.state().get_actor(addr).unwrap().unwrap().balance
}

fn nonce(vm: &VM<MemoryDB>, addr: &Address) -> u64 {
    vm.state().get_actor(addr).unwrap().unwrap().sequence
}

#[test]
fn pure_transfer_creates_account() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let receipt = vm.apply_message(&transfer_msg(*ALICE, *BOB, 30, 0)).unwrap();

    assert_eq!(receipt.exit_code, ExitCode::OK);
    assert!(receipt.return_data.is_empty());
    assert_eq!(receipt.gas_used, TokenAmount::from(0u64));

    // Affordability was checked against value + gas_limit * gas_price = 40.
    assert_eq!(balance(&vm, &ALICE), 60u64.into());
    assert_eq!(nonce(&vm, &ALICE), 1);
    assert_eq!(balance(&vm, &MINER), 0u64.into());

    // The recipient was materialized as an account actor holding the value.
    let bob = vm.state().get_actor(&BOB).unwrap().unwrap();
    assert_eq!(bob.code, *ACCOUNT_ACTOR_CODE_ID);
    assert_eq!(bob.balance, 30u64.into());
    assert_eq!(bob.sequence, 0);
    let bob_state: account::State = vm.state().store().get_obj(&bob.state).unwrap().unwrap();
    assert_eq!(bob_state.address, *BOB);
}

#[test]
fn insufficient_funds_is_hard_failure() {
    let h = setup(&[(*ALICE, 10, 0)]);
    let mut vm = make_vm(&h);

    let err = vm
        .apply_message(&transfer_msg(*ALICE, *BOB, 30, 0))
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { .. }));

    // No state change, no receipt.
    assert_eq!(balance(&vm, &ALICE), 10u64.into());
    assert_eq!(nonce(&vm, &ALICE), 0);
    assert_eq!(vm.state().get_actor(&BOB).unwrap(), None);
}

#[test]
fn bad_nonce_is_hard_failure() {
    let h = setup(&[(*ALICE, 100, 5)]);
    let mut vm = make_vm(&h);

    let err = vm
        .apply_message(&transfer_msg(*ALICE, *BOB, 30, 4))
        .unwrap_err();
    assert!(matches!(err, Error::BadNonce { expected: 5, got: 4 }));
    assert_eq!(balance(&vm, &ALICE), 100u64.into());
    assert_eq!(nonce(&vm, &ALICE), 5);
}

#[test]
fn sender_not_found_is_hard_failure() {
    let h = setup(&[]);
    let mut vm = make_vm(&h);

    let err = vm
        .apply_message(&transfer_msg(*ALICE, *BOB, 1, 0))
        .unwrap_err();
    assert!(matches!(err, Error::SenderNotFound(a) if a == *ALICE));
}

#[test]
fn non_account_recipient_is_hard_failure() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    // A contract-class address that does not exist cannot be materialized.
    let ghost = Address::new_contract(b"nobody home");
    let err = vm
        .apply_message(&transfer_msg(*ALICE, ghost, 1, 0))
        .unwrap_err();
    assert!(matches!(err, Error::RecipientNotCreatable(a) if a == ghost));
    assert_eq!(balance(&vm, &ALICE), 100u64.into());
    assert_eq!(nonce(&vm, &ALICE), 0);
}

#[test]
fn reverting_call_charges_gas_only() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);
    let puppet_head_pre = vm.state().get_actor(&PUPPET).unwrap().unwrap().state;

    let msg = UnsignedMessage::builder()
        .from(*ALICE)
        .to(*PUPPET)
        .sequence(0)
        .value(5u64.into())
        .method_num(METHOD_FAIL)
        .gas_limit(10u64.into())
        .gas_price(1u64.into())
        .build()
        .unwrap();
    let receipt = vm.apply_message(&msg).unwrap();

    assert_eq!(receipt.exit_code, ExitCode(7));
    assert_eq!(receipt.return_data, Serialized::new(vec![0xba, 0xad]));
    assert_eq!(receipt.gas_used, TokenAmount::from(3u64));

    // The only debit is the gas charge, which equals the miner credit; the
    // value never moved and the recipient state root is untouched.
    assert_eq!(balance(&vm, &ALICE), 97u64.into());
    assert_eq!(nonce(&vm, &ALICE), 1);
    assert_eq!(balance(&vm, &MINER), 3u64.into());
    let puppet = vm.state().get_actor(&PUPPET).unwrap().unwrap();
    assert_eq!(puppet.balance, 0u64.into());
    assert_eq!(puppet.state, puppet_head_pre);
}

#[test]
fn successful_call_refunds_unused_gas() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let msg = UnsignedMessage::builder()
        .from(*ALICE)
        .to(*PUPPET)
        .sequence(0)
        .value(5u64.into())
        .method_num(METHOD_CHARGE)
        .gas_limit(10u64.into())
        .gas_price(2u64.into())
        .build()
        .unwrap();
    let receipt = vm.apply_message(&msg).unwrap();

    assert_eq!(receipt.exit_code, ExitCode::OK);
    assert_eq!(receipt.gas_used, TokenAmount::from(4u64));

    // Sender net debit: value + gas_used * gas_price = 5 + 8.
    assert_eq!(balance(&vm, &ALICE), 87u64.into());
    assert_eq!(balance(&vm, &PUPPET), 5u64.into());
    assert_eq!(balance(&vm, &MINER), 8u64.into());

    // Conservation: no value created or destroyed by a dispatched call.
    let total = balance(&vm, &ALICE) + balance(&vm, &PUPPET) + balance(&vm, &MINER);
    assert_eq!(total, 100u64.into());
}

#[test]
fn gas_overrun_saturates_at_limit() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let receipt = vm
        .apply_message(&call_msg(*ALICE, *PUPPET, METHOD_OVERCHARGE, 0))
        .unwrap();

    assert_eq!(receipt.exit_code, ExitCode::SYS_OUT_OF_GAS);
    // gas_used is capped at the limit, never beyond.
    assert_eq!(receipt.gas_used, TokenAmount::from(10u64));
    assert_eq!(balance(&vm, &ALICE), 90u64.into());
    assert_eq!(balance(&vm, &MINER), 10u64.into());
    assert_eq!(nonce(&vm, &ALICE), 1);
}

#[test]
fn unknown_method_aborts_without_state_change() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let err = vm
        .apply_message(&call_msg(*ALICE, *PUPPET, 99, 0))
        .unwrap_err();
    assert!(matches!(err, Error::InvokerMissing { .. }));

    // The abort leaves the tree at the snapshot: no nonce bump, no debit.
    assert_eq!(balance(&vm, &ALICE), 100u64.into());
    assert_eq!(nonce(&vm, &ALICE), 0);
    assert_eq!(balance(&vm, &MINER), 0u64.into());
}

#[test]
fn missing_miner_actor_is_hard_failure() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = VM::new(&h.root, 1, Address::new_key(b"unknown miner"), &h.cs).unwrap();

    let err = vm
        .apply_message(&transfer_msg(*ALICE, *BOB, 1, 0))
        .unwrap_err();
    assert!(matches!(err, Error::MinerNotFound(_)));
    // The abort rolled the whole message back.
    assert_eq!(balance(&vm, &ALICE), 100u64.into());
    assert_eq!(nonce(&vm, &ALICE), 0);
}

#[test]
fn nested_send_propagates_origin_sender() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let msg = UnsignedMessage::builder()
        .from(*ALICE)
        .to(*PUPPET)
        .sequence(0)
        .method_num(METHOD_CALL_THROUGH)
        .params(Serialized::serialize((*PUPPET, METHOD_ECHO_SENDER)).unwrap())
        .gas_limit(10u64.into())
        .gas_price(1u64.into())
        .build()
        .unwrap();
    let receipt = vm.apply_message(&msg).unwrap();

    assert_eq!(receipt.exit_code, ExitCode::OK);
    // The sub-message carried the current frame's sender, not the callee.
    let echoed: Address = receipt.return_data.deserialize().unwrap();
    assert_eq!(echoed, *ALICE);
}

#[test]
fn nested_send_to_missing_actor_fails_soft() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let ghost = Address::new_key(b"never created");
    let msg = UnsignedMessage::builder()
        .from(*ALICE)
        .to(*PUPPET)
        .sequence(0)
        .method_num(METHOD_CALL_THROUGH)
        .params(Serialized::serialize((ghost, METHOD_ECHO_SENDER)).unwrap())
        .gas_limit(10u64.into())
        .gas_price(1u64.into())
        .build()
        .unwrap();
    let receipt = vm.apply_message(&msg).unwrap();

    // No implicit account creation inside send: the callee is missing and the
    // failure surfaces through the receipt.
    assert_eq!(receipt.exit_code, ExitCode::SYS_NOT_FOUND);
    assert_eq!(vm.state().get_actor(&ghost).unwrap(), None);
    assert_eq!(nonce(&vm, &ALICE), 1);
}

#[test]
fn storage_commits_persist_across_messages() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let r1 = vm
        .apply_message(&call_msg(*ALICE, *PUPPET, METHOD_INCREMENT, 0))
        .unwrap();
    assert_eq!(r1.exit_code, ExitCode::OK);
    assert_eq!(r1.return_data.deserialize::<u64>().unwrap(), 1);

    let r2 = vm
        .apply_message(&call_msg(*ALICE, *PUPPET, METHOD_INCREMENT, 1))
        .unwrap();
    assert_eq!(r2.return_data.deserialize::<u64>().unwrap(), 2);

    // The committed head landed on the actor header.
    let puppet = vm.state().get_actor(&PUPPET).unwrap().unwrap();
    let counter: u64 = vm.state().store().get_obj(&puppet.state).unwrap().unwrap();
    assert_eq!(counter, 2);
}

#[test]
fn state_tree_access_is_init_only() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let receipt = vm
        .apply_message(&call_msg(*ALICE, *PUPPET, METHOD_TOUCH_TREE, 0))
        .unwrap();
    assert_eq!(receipt.exit_code, ExitCode::SYS_FORBIDDEN);
}

#[test]
fn init_exec_creates_account_actor() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    let new_key = Address::new_key(b"fresh account pubkey");
    let params = Serialized::serialize(init::ExecParams {
        code_cid: *ACCOUNT_ACTOR_CODE_ID,
        constructor_params: Serialized::serialize(new_key).unwrap(),
    })
    .unwrap();

    let msg = UnsignedMessage::builder()
        .from(*ALICE)
        .to(*INIT_ACTOR_ADDR)
        .sequence(0)
        .method_num(init::Method::Exec as u64)
        .params(params)
        .gas_limit(100u64.into())
        .gas_price(0u64.into())
        .build()
        .unwrap();
    let receipt = vm.apply_message(&msg).unwrap();
    assert_eq!(receipt.exit_code, ExitCode::OK);

    let ret: init::ExecReturn = receipt.return_data.deserialize().unwrap();
    assert_eq!(ret.id_address, Address::new_id(FIRST_NON_SINGLETON_ID));

    let created = vm.state().get_actor(&ret.id_address).unwrap().unwrap();
    assert_eq!(created.code, *ACCOUNT_ACTOR_CODE_ID);
    let st: account::State = vm
        .state()
        .store()
        .get_obj(&created.state)
        .unwrap()
        .unwrap();
    assert_eq!(st.address, new_key);

    // The init actor's map resolves the robust address to the new ID.
    let init_act = vm.state().get_actor(&INIT_ACTOR_ADDR).unwrap().unwrap();
    let init_state: init::State = vm
        .state()
        .store()
        .get_obj(&init_act.state)
        .unwrap()
        .unwrap();
    assert_eq!(
        init_state
            .resolve_address(vm.state().store(), &ret.robust_address)
            .unwrap(),
        Some(ret.id_address)
    );
}

#[test]
fn transfer_funds_moves_balance() {
    let h = setup(&[(*ALICE, 100, 0), (*BOB, 10, 0)]);
    let mut vm = make_vm(&h);

    vm.transfer_funds(&ALICE, &BOB, &40u64.into()).unwrap();
    assert_eq!(balance(&vm, &ALICE), 60u64.into());
    assert_eq!(balance(&vm, &BOB), 50u64.into());

    // Self transfer is a no-op.
    vm.transfer_funds(&ALICE, &ALICE, &40u64.into()).unwrap();
    assert_eq!(balance(&vm, &ALICE), 60u64.into());

    // Overdraw and unknown parties are rejected.
    assert!(matches!(
        vm.transfer_funds(&ALICE, &BOB, &1000u64.into()),
        Err(Error::InsufficientFunds { .. })
    ));
    let ghost = Address::new_key(b"ghost");
    assert!(matches!(
        vm.transfer_funds(&ALICE, &ghost, &1u64.into()),
        Err(Error::ActorNotFound(_))
    ));
}

#[test]
fn implicit_message_skips_nonce_and_gas() {
    let h = setup(&[(*ALICE, 100, 7)]);
    let mut vm = make_vm(&h);

    // A system-originated transfer ignores the sender nonce entirely.
    let msg = UnsignedMessage::builder()
        .from(*ALICE)
        .to(*BOB)
        .sequence(0)
        .value(25u64.into())
        .method_num(METHOD_SEND)
        .build()
        .unwrap();
    let receipt = vm.apply_implicit_message(&msg).unwrap();

    assert_eq!(receipt.exit_code, ExitCode::OK);
    assert_eq!(receipt.gas_used, TokenAmount::from(0u64));
    assert_eq!(balance(&vm, &ALICE), 75u64.into());
    assert_eq!(balance(&vm, &BOB), 25u64.into());
    // No gas means no miner credit and no nonce movement.
    assert_eq!(balance(&vm, &MINER), 0u64.into());
    assert_eq!(nonce(&vm, &ALICE), 7);
}

#[test]
fn flush_publishes_resolvable_root() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    vm.apply_message(&transfer_msg(*ALICE, *BOB, 30, 0)).unwrap();
    let root = vm.flush(&CancelToken::new()).unwrap();
    h.cs.set_head_root(root);

    // A fresh VM loaded from the published root over the durable store alone
    // sees every actor, including the lazily created recipient.
    let vm2 = VM::new(&root, 2, *MINER, &h.cs).unwrap();
    assert_eq!(balance(&vm2, &ALICE), 60u64.into());
    let bob = vm2.state().get_actor(&BOB).unwrap().unwrap();
    assert_eq!(bob.balance, 30u64.into());
    let bob_state: account::State = vm2.state().store().get_obj(&bob.state).unwrap().unwrap();
    assert_eq!(bob_state.address, *BOB);
}

#[test]
fn flush_is_idempotent() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    vm.apply_message(&transfer_msg(*ALICE, *BOB, 30, 0)).unwrap();
    let root_a = vm.flush(&CancelToken::new()).unwrap();
    let root_b = vm.flush(&CancelToken::new()).unwrap();
    assert_eq!(root_a, root_b);
}

#[test]
fn cancelled_flush_returns_no_root() {
    let h = setup(&[(*ALICE, 100, 0)]);
    let mut vm = make_vm(&h);

    vm.apply_message(&transfer_msg(*ALICE, *BOB, 30, 0)).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    assert!(vm.flush(&cancel).is_err());

    // The session can still publish after a retry without cancellation.
    let root = vm.flush(&CancelToken::new()).unwrap();
    let vm2 = VM::new(&root, 2, *MINER, &h.cs).unwrap();
    assert_eq!(balance(&vm2, &BOB), 30u64.into());
}

#[test]
fn execution_is_deterministic() {
    let run = || {
        let h = setup(&[(*ALICE, 100, 0)]);
        let mut vm = make_vm(&h);
        let mut receipts = Vec::new();
        receipts.push(vm.apply_message(&transfer_msg(*ALICE, *BOB, 30, 0)).unwrap());
        receipts.push(
            vm.apply_message(&call_msg(*ALICE, *PUPPET, METHOD_INCREMENT, 1))
                .unwrap(),
        );
        receipts.push(
            vm.apply_message(&call_msg(*ALICE, *PUPPET, METHOD_FAIL, 2))
                .unwrap(),
        );
        (receipts, vm.flush(&CancelToken::new()).unwrap())
    };

    let (receipts_a, root_a) = run();
    let (receipts_b, root_b) = run();
    assert_eq!(receipts_a, receipts_b);
    assert_eq!(root_a, root_b);
}
