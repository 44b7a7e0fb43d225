use std::sync::Arc;

use num_bigint::BigUint;
use shard_runtime::{
    address::new_contract_address,
    fees::{Economics, EconomicsConfig, EconomicsHandler},
    BlockContext, MultiShardCoordinator, ReturnCode, ScQuery, ShardId, SmartContractResult,
    Transaction, TxProcessor,
};

use super::{CounterVm, SimulateLedger};

pub const NUMBER_OF_SHARDS: u32 = 3;
pub const GAS_PRICE: u64 = 10;

/// Lives in shard 0.
pub const INNER_SENDER: [u8; 32] = *b"12345678901234567890123456789010";
/// Lives in shard 1.
pub const OWNER: [u8; 32] = *b"12345678901234567890123456789011";
/// Lives in shard 2.
pub const RELAYER: [u8; 32] = *b"12345678901234567890123456789012";
/// Lives in shard 1.
pub const OTHER_IN_SHARD_1: [u8; 32] = *b"12345678901234567890123456789021";

pub const EMPTY_ADDRESS: [u8; 32] = [0u8; 32];

pub const VM_TYPE: [u8; 2] = [5, 0];

pub const DEPLOY_GAS_LIMIT: u64 = 2000;
pub const OWNER_INITIAL_BALANCE: u64 = 100_000;

/// One shard: its processor and the block being built.
pub struct TestShard {
    pub processor: TxProcessor<SimulateLedger>,
    pub block: BlockContext,
}

impl TestShard {
    pub fn new(self_id: ShardId) -> Self {
        Self::with_config(self_id, EconomicsConfig::default())
    }

    pub fn with_config(self_id: ShardId, config: EconomicsConfig) -> Self {
        Self::with_economics(self_id, Arc::new(Economics::new(config).unwrap()))
    }

    pub fn with_economics(self_id: ShardId, economics: Arc<dyn EconomicsHandler>) -> Self {
        let processor = TxProcessor::builder()
            .set_accounts(SimulateLedger::default())
            .set_virtual_machine(Arc::new(CounterVm))
            .set_shard_coordinator(Arc::new(
                MultiShardCoordinator::new(NUMBER_OF_SHARDS, self_id).unwrap(),
            ))
            .set_economics(economics)
            .build()
            .unwrap();
        Self {
            processor,
            block: BlockContext::new(),
        }
    }

    pub fn process_transaction(&mut self, tx: &Transaction) -> ReturnCode {
        self.processor
            .process_transaction(&mut self.block, tx)
            .unwrap()
    }

    pub fn process_result(&mut self, scr: &SmartContractResult) -> ReturnCode {
        self.processor
            .process_smart_contract_result(&mut self.block, scr)
            .unwrap()
    }

    pub fn ledger(&self) -> &SimulateLedger {
        self.processor.accounts()
    }

    pub fn ledger_mut(&mut self) -> &mut SimulateLedger {
        self.processor.accounts_mut()
    }

    pub fn balance(&self, address: &[u8; 32]) -> u64 {
        self.ledger().get_balance(address)
    }

    pub fn nonce(&self, address: &[u8; 32]) -> u64 {
        self.ledger().get_nonce(address)
    }

    pub fn accumulated_fees(&self) -> u64 {
        u64::try_from(self.block.fees().accumulated_fees()).unwrap()
    }

    pub fn developer_fees(&self) -> u64 {
        u64::try_from(self.block.fees().developer_fees()).unwrap()
    }

    /// Takes all results produced for other shards.
    pub fn take_intermediate_results(&mut self) -> Vec<SmartContractResult> {
        self.block
            .outbox_mut()
            .take_all()
            .into_values()
            .flatten()
            .collect()
    }

    pub fn create_block_started(&mut self) {
        self.block.create_block_started();
    }

    /// Value of the counter contract, read through a query.
    pub fn counter(&self, contract: &[u8; 32]) -> u64 {
        let output = self
            .processor
            .query_service()
            .execute_query(&ScQuery {
                contract: *contract,
                function: "get".to_string(),
                ..Default::default()
            })
            .unwrap();
        u64::try_from(BigUint::from_bytes_be(&output.return_data[0])).unwrap()
    }

    /// Deploys the counter contract from [OWNER] and checks the deployment fees. Fees and
    /// intermediate results are reset afterwards.
    pub fn deploy_counter(&mut self) -> [u8; 32] {
        self.ledger_mut().set_balance(&OWNER, OWNER_INITIAL_BALANCE);

        let tx = TestData::transaction(
            0,
            0,
            OWNER,
            EMPTY_ADDRESS,
            DEPLOY_GAS_LIMIT,
            TestData::deploy_data(&TestData::counter_code()),
        );
        assert_eq!(self.process_transaction(&tx), ReturnCode::Ok);

        assert_eq!(self.balance(&OWNER), 89_030);
        assert_eq!(self.nonce(&OWNER), 1);
        assert_eq!(self.accumulated_fees(), 10_970);
        assert_eq!(self.developer_fees(), 368);

        let contract = new_contract_address(&OWNER, 0, VM_TYPE);
        assert_eq!(self.ledger().get_developer_reward(&contract), 368);
        self.create_block_started();
        contract
    }
}

pub struct TestData {}

impl TestData {
    pub fn transaction(
        nonce: u64,
        value: u64,
        sender: [u8; 32],
        receiver: [u8; 32],
        gas_limit: u64,
        data: Vec<u8>,
    ) -> Transaction {
        Transaction {
            nonce,
            value: BigUint::from(value),
            receiver,
            sender,
            gas_price: GAS_PRICE,
            gas_limit,
            data,
        }
    }

    /// 359 bytes of contract code. Its deploy data is 728 bytes long.
    pub fn counter_code() -> Vec<u8> {
        let mut code = b"\0asm\x01\0\0\0".to_vec();
        code.resize(359, 0x0b);
        code
    }

    /// `hex(code)@0500@0100`
    pub fn deploy_data(code: &[u8]) -> Vec<u8> {
        format!(
            "{}@{}@{}",
            hex::encode(code),
            hex::encode(VM_TYPE),
            hex::encode([1u8, 0u8])
        )
        .into_bytes()
    }

    /// Argument of the `forward` function of the counter contract.
    pub fn gas_arg(gas: u64) -> Vec<u8> {
        gas.to_be_bytes().to_vec()
    }
}
