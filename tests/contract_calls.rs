use assert_matches::assert_matches;
use num_bigint::BigUint;
use shard_runtime::{
    address::new_contract_address, execution::call_data::build_call_data, AccountsAdapter,
    CallDataError, ProcessError, ReturnCode,
};

use crate::common::{
    TestData, TestShard, EMPTY_ADDRESS, INCREMENT_GAS, INNER_SENDER, OTHER_IN_SHARD_1, OWNER,
    RELAYER, VM_TYPE,
};

mod common;

#[test]
fn deploy_charges_move_balance_and_constructor_gas() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    let account = shard.ledger().get_account(&contract).unwrap();
    assert_eq!(account.owner, Some(OWNER));
    assert!(account.code_hash.is_some());
    assert_eq!(shard.counter(&contract), 1);
    assert!(shard.take_intermediate_results().is_empty());
}

#[test]
fn failed_deploy_keeps_fee_and_returns_value() {
    let mut shard = TestShard::new(1);
    shard.ledger_mut().set_balance(&OWNER, 100_000);

    // 729 gas go to the move balance cost, the constructor needs 368 of the remaining 100
    let tx = TestData::transaction(
        0,
        500,
        OWNER,
        EMPTY_ADDRESS,
        729 + 100,
        TestData::deploy_data(&TestData::counter_code()),
    );
    assert_eq!(shard.process_transaction(&tx), ReturnCode::UserError);

    assert_eq!(shard.balance(&OWNER), 100_000 - 8290);
    assert_eq!(shard.nonce(&OWNER), 1);
    assert_eq!(shard.accumulated_fees(), 8290);
    assert_eq!(shard.developer_fees(), 0);
    assert!(!shard
        .ledger()
        .exists(&new_contract_address(&OWNER, 0, VM_TYPE)));
}

#[test]
fn malformed_deploy_data_is_rejected() {
    let mut shard = TestShard::new(1);
    shard.ledger_mut().set_balance(&OWNER, 10_000);

    let tx = TestData::transaction(0, 10, OWNER, EMPTY_ADDRESS, 100, b"zz@0500".to_vec());
    assert_matches!(
        shard.processor.process_transaction(&mut shard.block, &tx),
        Err(ProcessError::MalformedData(CallDataError::InvalidHexArgument { index: 0 }))
    );
    assert_eq!(shard.balance(&OWNER), 10_000);
    assert_eq!(shard.nonce(&OWNER), 0);
    assert_eq!(shard.accumulated_fees(), 0);
    assert!(shard.take_intermediate_results().is_empty());
}

#[test]
fn local_call_refunds_unused_gas() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    let tx = TestData::transaction(1, 0, OWNER, contract, 1000, b"increment".to_vec());
    assert_eq!(shard.process_transaction(&tx), ReturnCode::Ok);

    assert_eq!(shard.counter(&contract), 2);
    assert_eq!(shard.accumulated_fees(), 100 + INCREMENT_GAS * 10);
    assert_eq!(shard.developer_fees(), 376);
    assert_eq!(shard.balance(&OWNER), 89_030 - 3_860);
    assert_eq!(shard.nonce(&OWNER), 2);
    assert_eq!(shard.ledger().get_developer_reward(&contract), 368 + 376);
    assert!(shard.take_intermediate_results().is_empty());
}

#[test]
fn failed_call_consumes_all_gas_and_returns_value() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    for (nonce, function) in [(1, "fail"), (2, "incremeno")] {
        let balance = shard.balance(&OWNER);
        let data = function.as_bytes().to_vec();
        let tx = TestData::transaction(nonce, 50, OWNER, contract, 1000, data);
        assert_eq!(shard.process_transaction(&tx), ReturnCode::UserError);
        assert_eq!(shard.balance(&OWNER), balance - 10_000);
        assert_eq!(shard.nonce(&OWNER), nonce + 1);
    }

    assert_eq!(shard.counter(&contract), 1);
    assert_eq!(shard.balance(&contract), 0);
    assert_eq!(shard.accumulated_fees(), 20_000);
    assert_eq!(shard.developer_fees(), 0);
}

#[test]
fn call_to_missing_contract_fails() {
    let mut shard = TestShard::new(1);
    shard.ledger_mut().set_balance(&OWNER, 10_000);
    let missing = new_contract_address(&OWNER, 7, VM_TYPE);

    let tx = TestData::transaction(0, 0, OWNER, missing, 100, b"increment".to_vec());
    assert_eq!(shard.process_transaction(&tx), ReturnCode::UserError);
    assert_eq!(shard.balance(&OWNER), 9_000);
    assert_eq!(shard.accumulated_fees(), 1_000);
}

#[test]
fn malformed_call_data_is_rejected() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    let tx = TestData::transaction(1, 5, OWNER, contract, 100, b"@zz".to_vec());
    assert_matches!(
        shard.processor.process_transaction(&mut shard.block, &tx),
        Err(ProcessError::MalformedData(CallDataError::InvalidFunctionName))
    );
    assert_eq!(shard.balance(&OWNER), 89_030);
    assert_eq!(shard.nonce(&OWNER), 1);
    assert_eq!(shard.accumulated_fees(), 0);
    assert_eq!(shard.balance(&contract), 0);
}

#[test]
fn contract_out_of_funds_is_reverted() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    // the contract holds only the 100 of the call value
    let data = build_call_data(
        "send",
        &[RELAYER.to_vec(), BigUint::from(300u64).to_bytes_be()],
    );
    let tx = TestData::transaction(1, 100, OWNER, contract, 2000, data);
    assert_eq!(shard.process_transaction(&tx), ReturnCode::OutOfFunds);

    // 75 move balance gas and all 1925 gas given to the contract
    assert_eq!(shard.accumulated_fees(), 20_000);
    assert_eq!(shard.developer_fees(), 0);
    assert_eq!(shard.nonce(&OWNER), 2);
    // the call value comes back through the error result
    assert_eq!(shard.balance(&OWNER), 89_030 - 20_000);
    assert_eq!(shard.balance(&contract), 0);
    assert_eq!(shard.ledger().get_developer_reward(&contract), 368);
    assert!(shard.take_intermediate_results().is_empty());
}

#[test]
fn contract_reporting_too_much_gas_is_reverted() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    let tx = TestData::transaction(1, 50, OWNER, contract, 1000, b"overspend".to_vec());
    assert_eq!(shard.process_transaction(&tx), ReturnCode::ExecutionFailed);

    assert_eq!(shard.counter(&contract), 1);
    assert_eq!(shard.accumulated_fees(), 10_000);
    assert_eq!(shard.developer_fees(), 0);
    assert_eq!(shard.nonce(&OWNER), 2);
    assert_eq!(shard.balance(&OWNER), 89_030 - 10_000);
    assert_eq!(shard.balance(&contract), 0);
    assert!(shard.take_intermediate_results().is_empty());
}

#[test]
fn contract_transfer_to_other_shard() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    let data = build_call_data(
        "send",
        &[RELAYER.to_vec(), BigUint::from(300u64).to_bytes_be()],
    );
    assert_eq!(data.len(), 74);
    let tx = TestData::transaction(1, 1000, OWNER, contract, 2000, data);
    assert_eq!(shard.process_transaction(&tx), ReturnCode::Ok);

    assert_eq!(shard.balance(&contract), 700);
    assert_eq!(shard.accumulated_fees(), 750 + 2000);
    assert_eq!(shard.developer_fees(), 200);
    assert_eq!(shard.balance(&OWNER), 89_030 - 1000 - 2750);

    let transfers = shard.block.outbox_mut().take_results_for_shard(2);
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].sender, contract);
    assert_eq!(transfers[0].receiver, RELAYER);
    assert_eq!(transfers[0].value, BigUint::from(300u64));

    let mut relayer_shard = TestShard::new(2);
    assert_eq!(relayer_shard.process_result(&transfers[0]), ReturnCode::Ok);
    assert_eq!(relayer_shard.balance(&RELAYER), 300);
}

#[test]
fn contract_call_to_local_contract_is_applied_in_same_pass() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    let data = build_call_data(
        "forward",
        &[
            contract.to_vec(),
            b"increment".to_vec(),
            TestData::gas_arg(400),
        ],
    );
    assert_eq!(data.len(), 108);
    let tx = TestData::transaction(1, 0, OWNER, contract, 2000, data);
    assert_eq!(shard.process_transaction(&tx), ReturnCode::Ok);

    assert_eq!(shard.counter(&contract), 2);
    // forward: 109 move balance + 300, increment: 376
    assert_eq!(shard.accumulated_fees(), 1090 + 3000 + 3760);
    assert_eq!(shard.developer_fees(), 300 + 376);
    assert_eq!(shard.balance(&OWNER), 89_030 - 7_850);
    assert!(shard.take_intermediate_results().is_empty());
}

#[test]
fn cross_shard_call_carries_value_and_gas() {
    let mut sender_shard = TestShard::new(0);
    let mut contract_shard = TestShard::new(1);
    let contract = contract_shard.deploy_counter();
    sender_shard.ledger_mut().set_balance(&INNER_SENDER, 10_000);

    let tx = TestData::transaction(0, 50, INNER_SENDER, contract, 500, b"increment".to_vec());
    assert_eq!(sender_shard.process_transaction(&tx), ReturnCode::Ok);
    assert_eq!(sender_shard.balance(&INNER_SENDER), 10_000 - 50 - 5_000);
    assert_eq!(sender_shard.accumulated_fees(), 100);

    let call = sender_shard.take_intermediate_results();
    assert_eq!(call.len(), 1);
    assert_eq!(call[0].gas_limit, 490);
    assert_eq!(call[0].relayer, None);

    assert_eq!(contract_shard.process_result(&call[0]), ReturnCode::Ok);
    assert_eq!(contract_shard.balance(&contract), 50);
    assert_eq!(contract_shard.counter(&contract), 2);

    let refund = contract_shard.take_intermediate_results();
    assert_eq!(refund.len(), 1);
    assert_eq!(refund[0].receiver, INNER_SENDER);
    assert_eq!(sender_shard.process_result(&refund[0]), ReturnCode::Ok);
    assert_eq!(sender_shard.balance(&INNER_SENDER), 10_000 - 50 - 100 - 3_760);
}

#[test]
fn return_data_to_contract_refunds_carried_gas() {
    let mut sender_shard = TestShard::new(0);
    let mut contract_shard = TestShard::new(1);
    let contract = contract_shard.deploy_counter();
    sender_shard.ledger_mut().set_balance(&INNER_SENDER, 10_000);

    let tx = TestData::transaction(0, 0, INNER_SENDER, contract, 500, b"@00".to_vec());
    assert_eq!(sender_shard.process_transaction(&tx), ReturnCode::Ok);
    assert_eq!(sender_shard.accumulated_fees(), 40);

    let call = sender_shard.take_intermediate_results();
    assert_eq!(call[0].gas_limit, 496);

    assert_eq!(contract_shard.process_result(&call[0]), ReturnCode::Ok);
    assert_eq!(contract_shard.counter(&contract), 1);
    assert_eq!(contract_shard.accumulated_fees(), 0);

    let refund = contract_shard.take_intermediate_results();
    assert_eq!(refund.len(), 1);
    assert!(refund[0].is_refund);
    assert_eq!(refund[0].receiver, INNER_SENDER);
    assert_eq!(refund[0].value, BigUint::from(4960u64));

    assert_eq!(sender_shard.process_result(&refund[0]), ReturnCode::Ok);
    assert_eq!(sender_shard.balance(&INNER_SENDER), 10_000 - 40);
}

#[test]
fn contract_call_to_user_refunds_forwarded_gas() {
    let mut shard = TestShard::new(1);
    let contract = shard.deploy_counter();

    let data = build_call_data(
        "forward",
        &[
            OTHER_IN_SHARD_1.to_vec(),
            b"increment".to_vec(),
            TestData::gas_arg(400),
        ],
    );
    let tx = TestData::transaction(1, 0, OWNER, contract, 2000, data);
    assert_eq!(shard.process_transaction(&tx), ReturnCode::Ok);

    // forward: 109 move balance + 300, the 400 forwarded gas are not spent
    assert_eq!(shard.accumulated_fees(), 1090 + 3000);
    assert_eq!(shard.developer_fees(), 300);
    assert_eq!(shard.balance(&OWNER), 89_030 - 4_090);
    assert_eq!(shard.balance(&OTHER_IN_SHARD_1), 0);
    assert!(shard.take_intermediate_results().is_empty());
}
