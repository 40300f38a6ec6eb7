use bytes::Bytes;
use ethereum_types::{Address, U256};
use frevm::{
    constants::STACK_DEPTH_LIMIT,
    operations::{ops_to_bytecode, Operation},
    testing::{
        default_caller, default_target, message_with_code, message_with_ops, new_db,
        new_db_with_accounts,
    },
    utils::{address_to_word, calculate_create_address, get_account},
    Account, Environment, Evm, Vm,
};
use std::collections::HashMap;

// cargo test -p frevm

const TEST_GAS: u64 = 100_000;

fn run_ops(operations: &[Operation]) -> Evm {
    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);
    vm.process_message(message_with_ops(operations, U256::from(TEST_GAS)))
        .unwrap()
}

/// A program that returns `return_value` as a 32-byte word.
fn callee_return_bytecode(return_value: U256) -> Bytes {
    ops_to_bytecode(&[
        Operation::Push((32, return_value)), // value
        Operation::Push((1, U256::zero())),  // offset
        Operation::Mstore,
        Operation::Push((1, U256::from(32))), // size
        Operation::Push((1, U256::zero())),   // offset
        Operation::Return,
    ])
}

/// Pushes the seven CALL/CALLCODE operands so that `gas` ends up on top.
fn call_args(gas: u64, to: Address, value: u64, out_size: u64) -> Vec<Operation> {
    vec![
        Operation::Push((1, U256::from(out_size))), // out size
        Operation::Push((1, U256::zero())),         // out offset
        Operation::Push((1, U256::zero())),         // in size
        Operation::Push((1, U256::zero())),         // in offset
        Operation::Push((1, U256::from(value))),
        Operation::Push((20, address_to_word(to))),
        Operation::Push((3, U256::from(gas))),
    ]
}

#[test]
fn empty_code_is_an_implicit_stop() {
    let evm = run_ops(&[]);

    assert!(!evm.running);
    assert!(!evm.has_erred);
    assert_eq!(evm.gas_left, U256::from(TEST_GAS));
    assert!(evm.output.is_empty());
}

#[test]
fn stop_halts_without_output() {
    let evm = run_ops(&[Operation::Push((1, U256::from(7))), Operation::Stop]);

    assert!(!evm.has_erred);
    assert_eq!(evm.stack.stack, vec![U256::from(7)]);
    assert_eq!(evm.gas_left, U256::from(TEST_GAS - 3));
}

#[test]
fn mstore_mload_round_trip() {
    let value = U256::from(0xdead_beef_u64);
    let evm = run_ops(&[
        Operation::Push((32, value)),
        Operation::Push((1, U256::zero())),
        Operation::Mstore,
        Operation::Push((1, U256::zero())),
        Operation::Mload,
        Operation::Stop,
    ]);

    assert!(!evm.has_erred);
    assert_eq!(evm.stack.stack, vec![value]);
    assert_eq!(evm.memory.len(), 32);
}

#[test]
fn msize_tracks_word_aligned_expansion() {
    let evm = run_ops(&[
        Operation::Push((1, U256::from(0xff))),
        Operation::Push((1, U256::from(33))), // expands to 96 bytes
        Operation::Mstore8,
        Operation::Msize,
        Operation::Stop,
    ]);

    assert!(!evm.has_erred);
    assert_eq!(evm.stack.stack, vec![U256::from(64)]);
}

#[test]
fn address_pushes_the_executing_account() {
    let evm = run_ops(&[Operation::Address, Operation::Stop]);

    assert_eq!(evm.stack.stack, vec![address_to_word(default_target())]);
    assert_eq!(evm.gas_left, U256::from(TEST_GAS - 2));
}

#[test]
fn caller_and_callvalue_come_from_the_message() {
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        default_caller(),
        Account::new(U256::from(10), Bytes::new(), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut message = message_with_ops(
        &[Operation::Caller, Operation::Callvalue, Operation::Stop],
        U256::from(TEST_GAS),
    );
    message.value = U256::from(3);
    let evm = vm.process_message(message).unwrap();

    assert_eq!(
        evm.stack.stack,
        vec![address_to_word(default_caller()), U256::from(3)]
    );
    // The endowment moved before the code ran.
    assert_eq!(get_account(&db, default_target()).info.balance, U256::from(3));
    assert_eq!(get_account(&db, default_caller()).info.balance, U256::from(7));
}

#[test]
fn origin_and_gasprice_come_from_the_environment() {
    let origin = Address::from_low_u64_be(0xbeef);
    let env = Environment::new(origin, U256::from(13));
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);

    let evm = vm
        .process_message(message_with_ops(
            &[Operation::Origin, Operation::Gasprice, Operation::Stop],
            U256::from(TEST_GAS),
        ))
        .unwrap();

    assert_eq!(evm.stack.stack, vec![address_to_word(origin), U256::from(13)]);
}

#[test]
fn balance_of_absent_account_is_zero() {
    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);

    // Gas budget 25: BALANCE costs 20, leaving 5.
    let mut evm = Evm::new(message_with_code(Bytes::new(), U256::from(25)));
    evm.stack
        .push(address_to_word(Address::from_low_u64_be(0xdead)))
        .unwrap();
    vm.op_balance(&mut evm).unwrap();

    assert_eq!(evm.stack.stack, vec![U256::zero()]);
    assert_eq!(evm.gas_left, U256::from(5));
}

#[test]
fn balance_reads_existing_accounts() {
    let rich = Address::from_low_u64_be(0xaaaa);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        rich,
        Account::new(U256::from(1234), Bytes::new(), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let evm = vm
        .process_message(message_with_ops(
            &[
                Operation::Push((20, address_to_word(rich))),
                Operation::Balance,
                Operation::Stop,
            ],
            U256::from(TEST_GAS),
        ))
        .unwrap();

    assert_eq!(evm.stack.stack, vec![U256::from(1234)]);
}

#[test]
fn calldataload_past_the_end_is_right_padded() {
    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);

    let mut message = message_with_ops(
        &[
            Operation::Push((1, U256::zero())),
            Operation::CallDataLoad,
            Operation::Stop,
        ],
        U256::from(TEST_GAS),
    );
    message.data = Bytes::copy_from_slice(&[0xaa]);
    let evm = vm.process_message(message).unwrap();

    let mut expected = [0u8; 32];
    expected[0] = 0xaa;
    assert_eq!(evm.stack.stack, vec![U256::from_big_endian(&expected)]);
}

#[test]
fn calldatasize_pushes_the_input_length() {
    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);

    let mut message =
        message_with_ops(&[Operation::CallDataSize, Operation::Stop], U256::from(TEST_GAS));
    message.data = Bytes::copy_from_slice(&[1, 2, 3]);
    let evm = vm.process_message(message).unwrap();

    assert_eq!(evm.stack.stack, vec![U256::from(3)]);
}

#[test]
fn calldatacopy_zero_size_charges_only_the_static_cost() {
    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);

    let mut evm = Evm::new(message_with_code(Bytes::new(), U256::from(TEST_GAS)));
    evm.stack.push(U256::zero()).unwrap(); // size
    evm.stack.push(U256::from(99)).unwrap(); // data offset
    evm.stack.push(U256::from(5)).unwrap(); // dest offset
    vm.op_calldatacopy(&mut evm).unwrap();

    assert_eq!(evm.gas_left, U256::from(TEST_GAS - 3));
    assert_eq!(evm.memory.len(), 0);
    assert_eq!(evm.pc, 1);
}

#[test]
fn calldatacopy_pads_with_zeros_where_data_runs_out() {
    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);

    let mut message = message_with_ops(
        &[
            Operation::Push((1, U256::from(4))),  // size
            Operation::Push((1, U256::from(2))),  // data offset
            Operation::Push((1, U256::zero())),   // dest offset
            Operation::CallDataCopy,
            Operation::Push((1, U256::from(32))),
            Operation::Push((1, U256::zero())),
            Operation::Return,
        ],
        U256::from(TEST_GAS),
    );
    message.data = Bytes::copy_from_slice(&[0x11, 0x22, 0x33]);
    let evm = vm.process_message(message).unwrap();

    let mut expected = [0u8; 32];
    expected[0] = 0x33;
    assert_eq!(evm.output, Bytes::copy_from_slice(&expected));
}

#[test]
fn codecopy_of_the_whole_code_reproduces_it() {
    let operations = [
        Operation::Push((1, U256::from(12))), // size = total bytecode length
        Operation::Push((1, U256::zero())),   // code offset
        Operation::Push((1, U256::zero())),   // dest offset
        Operation::Codecopy,
        Operation::Push((1, U256::from(12))),
        Operation::Push((1, U256::zero())),
        Operation::Return,
    ];
    let bytecode = ops_to_bytecode(&operations);
    assert_eq!(bytecode.len(), 12);

    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);
    let evm = vm
        .process_message(message_with_code(bytecode.clone(), U256::from(TEST_GAS)))
        .unwrap();

    assert!(!evm.has_erred);
    assert_eq!(evm.output, bytecode);
}

#[test]
fn extcodesize_and_extcodecopy_read_foreign_code() {
    let library = Address::from_low_u64_be(0x1234);
    let code = Bytes::copy_from_slice(&[0x60, 0x2a, 0x00]);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        library,
        Account::new(U256::zero(), code.clone(), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let evm = vm
        .process_message(message_with_ops(
            &[
                Operation::Push((20, address_to_word(library))),
                Operation::ExtcodeSize,
                // Copy 32 bytes of the library code (zero padded) to memory.
                Operation::Push((1, U256::from(32))), // size
                Operation::Push((1, U256::zero())),   // code offset
                Operation::Push((1, U256::zero())),   // dest offset
                Operation::Push((20, address_to_word(library))),
                Operation::ExtcodeCopy,
                Operation::Push((1, U256::from(32))),
                Operation::Push((1, U256::zero())),
                Operation::Return,
            ],
            U256::from(TEST_GAS),
        ))
        .unwrap();

    assert_eq!(evm.stack.stack, vec![U256::from(3)]);
    let mut expected = [0u8; 32];
    expected[..3].copy_from_slice(&code);
    assert_eq!(evm.output, Bytes::copy_from_slice(&expected));
}

#[test]
fn extcodesize_of_absent_account_is_zero() {
    let evm = run_ops(&[
        Operation::Push((20, address_to_word(Address::from_low_u64_be(0x9999)))),
        Operation::ExtcodeSize,
        Operation::Stop,
    ]);

    assert_eq!(evm.stack.stack, vec![U256::zero()]);
}

#[test]
fn call_runs_the_callee_and_copies_its_output() {
    let callee = Address::from_low_u64_be(0xc0de);
    let return_value = U256::from(0x2a);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        callee,
        Account::new(U256::zero(), callee_return_bytecode(return_value), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut operations = call_args(50_000, callee, 0, 32);
    operations.extend([
        Operation::Call,
        Operation::Push((1, U256::from(32))),
        Operation::Push((1, U256::zero())),
        Operation::Return,
    ]);
    let evm = vm
        .process_message(message_with_ops(&operations, U256::from(TEST_GAS)))
        .unwrap();

    assert!(!evm.has_erred);
    // Success flag on the stack, callee output copied into the out region.
    assert_eq!(evm.stack.stack, vec![U256::one()]);
    assert_eq!(evm.output, Bytes::copy_from_slice(&return_value.to_big_endian()));
    assert_eq!(evm.children.len(), 1);
    assert!(!evm.children[0].has_erred);
    assert!(evm.children[0].gas_left.is_zero());
}

#[test]
fn call_with_value_gets_the_stipend_and_transfers() {
    // The callee does not exist: the fee takes the new-account surcharge and
    // the child is a pure implicit STOP that hands its whole budget back.
    let callee = Address::from_low_u64_be(0xf4e5);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        default_target(),
        Account::new(U256::from(100), Bytes::new(), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut evm = Evm::new(message_with_code(Bytes::new(), U256::from(TEST_GAS)));
    // Operands, pushed so that gas ends on top.
    evm.stack.push(U256::zero()).unwrap(); // out size
    evm.stack.push(U256::zero()).unwrap(); // out offset
    evm.stack.push(U256::zero()).unwrap(); // in size
    evm.stack.push(U256::zero()).unwrap(); // in offset
    evm.stack.push(U256::one()).unwrap(); // value
    evm.stack.push(address_to_word(callee)).unwrap();
    evm.stack.push(U256::from(2300)).unwrap(); // gas
    vm.op_call(&mut evm).unwrap();

    // Fee: 2300 granted + 40 base + 25000 new account + 9000 value.
    // The child received 2300 + 2300 stipend and returned all of it.
    let expected = U256::from(TEST_GAS) - U256::from(2300 + 40 + 25000 + 9000) + U256::from(4600);
    assert_eq!(evm.gas_left, expected);
    assert_eq!(evm.stack.stack, vec![U256::one()]);
    assert_eq!(get_account(&db, callee).info.balance, U256::one());
    assert_eq!(get_account(&db, default_target()).info.balance, U256::from(99));
}

#[test]
fn call_at_the_depth_ceiling_is_rejected_with_a_refund() {
    let callee = Address::from_low_u64_be(0xc0de);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        callee,
        // Code that would blow up if it ever ran.
        Account::new(U256::zero(), Bytes::copy_from_slice(&[0xfe]), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut message = message_with_code(Bytes::new(), U256::from(TEST_GAS));
    message.depth = STACK_DEPTH_LIMIT;
    let mut evm = Evm::new(message);
    evm.stack.push(U256::zero()).unwrap(); // out size
    evm.stack.push(U256::zero()).unwrap(); // out offset
    evm.stack.push(U256::zero()).unwrap(); // in size
    evm.stack.push(U256::zero()).unwrap(); // in offset
    evm.stack.push(U256::one()).unwrap(); // value: stipend applies
    evm.stack.push(address_to_word(callee)).unwrap();
    evm.stack.push(U256::from(1000)).unwrap(); // gas
    vm.op_call(&mut evm).unwrap();

    // Pushed 0 without running the callee, and refunded gas + stipend. The
    // callee exists, so no new-account surcharge applies.
    assert_eq!(evm.stack.stack, vec![U256::zero()]);
    let expected = U256::from(TEST_GAS) - U256::from(1000 + 40 + 9000) + U256::from(3300);
    assert_eq!(evm.gas_left, expected);
    assert!(evm.children.is_empty());
}

#[test]
fn call_balance_shortfall_is_rejected_with_a_refund() {
    let callee = Address::from_low_u64_be(0xc0de);
    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);

    // current_target has no balance at all; any nonzero value must bounce.
    let mut evm = Evm::new(message_with_code(Bytes::new(), U256::from(TEST_GAS)));
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::from(5)).unwrap();
    evm.stack.push(address_to_word(callee)).unwrap();
    evm.stack.push(U256::from(1000)).unwrap();
    vm.op_call(&mut evm).unwrap();

    assert_eq!(evm.stack.stack, vec![U256::zero()]);
    assert!(evm.children.is_empty());
}

#[test]
fn failed_child_reverts_its_state_and_burns_its_gas() {
    let callee = Address::from_low_u64_be(0xbad);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([
        (
            default_target(),
            Account::new(U256::from(50), Bytes::new(), 0, HashMap::new()),
        ),
        (
            callee,
            // Undefined opcode: the child halts exceptionally at once.
            Account::new(U256::zero(), Bytes::copy_from_slice(&[0xef]), 0, HashMap::new()),
        ),
    ]));
    let mut vm = Vm::new(&env, &mut db);

    let mut evm = Evm::new(message_with_code(Bytes::new(), U256::from(TEST_GAS)));
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::zero()).unwrap();
    evm.stack.push(U256::from(5)).unwrap(); // value
    evm.stack.push(address_to_word(callee)).unwrap();
    evm.stack.push(U256::from(1000)).unwrap();
    vm.op_call(&mut evm).unwrap();

    // Failure flag, the transferred value rolled back, child gas burned.
    assert_eq!(evm.stack.stack, vec![U256::zero()]);
    assert_eq!(get_account(&db, default_target()).info.balance, U256::from(50));
    assert_eq!(get_account(&db, callee).info.balance, U256::zero());
    assert_eq!(evm.children.len(), 1);
    assert!(evm.children[0].has_erred);
    assert!(evm.children[0].gas_left.is_zero());
    let expected = U256::from(TEST_GAS) - U256::from(1000 + 40 + 9000);
    assert_eq!(evm.gas_left, expected);
}

#[test]
fn callcode_runs_foreign_code_against_the_callers_account() {
    let library = Address::from_low_u64_be(0x11b);
    // The library just reports ADDRESS: under CALLCODE that must be the
    // caller's account, not the library's.
    let library_code = ops_to_bytecode(&[
        Operation::Address,
        Operation::Push((1, U256::zero())),
        Operation::Mstore,
        Operation::Push((1, U256::from(32))),
        Operation::Push((1, U256::zero())),
        Operation::Return,
    ]);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        library,
        Account::new(U256::zero(), library_code, 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut operations = call_args(50_000, library, 0, 32);
    operations.extend([
        Operation::CallCode,
        Operation::Push((1, U256::from(32))),
        Operation::Push((1, U256::zero())),
        Operation::Return,
    ]);
    let evm = vm
        .process_message(message_with_ops(&operations, U256::from(TEST_GAS)))
        .unwrap();

    assert!(!evm.has_erred);
    assert_eq!(evm.stack.stack, vec![U256::one()]);
    assert_eq!(
        evm.output,
        Bytes::copy_from_slice(&address_to_word(default_target()).to_big_endian())
    );
}

#[test]
fn callcode_value_stays_on_the_callers_account() {
    let library = Address::from_low_u64_be(0x11b);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([
        (
            default_target(),
            Account::new(U256::from(30), Bytes::new(), 0, HashMap::new()),
        ),
        (
            library,
            Account::new(U256::zero(), Bytes::new(), 0, HashMap::new()),
        ),
    ]));
    let mut vm = Vm::new(&env, &mut db);

    let mut operations = call_args(1000, library, 7, 0);
    operations.push(Operation::CallCode);
    operations.push(Operation::Stop);
    let evm = vm
        .process_message(message_with_ops(&operations, U256::from(TEST_GAS)))
        .unwrap();

    assert_eq!(evm.stack.stack, vec![U256::one()]);
    // Self-to-self transfer: nothing moved anywhere.
    assert_eq!(get_account(&db, default_target()).info.balance, U256::from(30));
    assert_eq!(get_account(&db, library).info.balance, U256::zero());
}

#[test]
fn create_deploys_the_returned_code() {
    // Init code: MSTORE8 0x2a at 0, return that single byte as the contract.
    let init_code = ops_to_bytecode(&[
        Operation::Push((1, U256::from(0x2a))),
        Operation::Push((1, U256::zero())),
        Operation::Mstore8,
        Operation::Push((1, U256::one())),  // size
        Operation::Push((1, U256::zero())), // offset
        Operation::Return,
    ]);
    let mut init_word = [0u8; 32];
    init_word[..init_code.len()].copy_from_slice(&init_code);

    let operations = [
        Operation::Push((32, U256::from_big_endian(&init_word))),
        Operation::Push((1, U256::zero())),
        Operation::Mstore,
        Operation::Push((1, U256::from(init_code.len() as u64))), // size
        Operation::Push((1, U256::zero())),                       // offset
        Operation::Push((1, U256::zero())),                       // endowment
        Operation::Create,
        Operation::Stop,
    ];

    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);
    let evm = vm
        .process_message(message_with_ops(&operations, U256::from(TEST_GAS)))
        .unwrap();

    assert!(!evm.has_erred);
    let created = calculate_create_address(default_target(), 0).unwrap();
    assert_eq!(evm.stack.stack, vec![address_to_word(created)]);
    assert_eq!(get_account(&db, created).code, Bytes::copy_from_slice(&[0x2a]));
    assert_eq!(get_account(&db, default_target()).info.nonce, 1);
    assert_eq!(evm.children.len(), 1);
    assert!(!evm.children[0].has_erred);
}

#[test]
fn create_with_insufficient_balance_keeps_nonce_and_gas() {
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        default_target(),
        Account::new(U256::from(10), Bytes::new(), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut evm = Evm::new(message_with_code(Bytes::new(), U256::from(TEST_GAS)));
    evm.stack.push(U256::zero()).unwrap(); // size
    evm.stack.push(U256::zero()).unwrap(); // offset
    evm.stack.push(U256::from(11)).unwrap(); // endowment > balance
    vm.op_create(&mut evm).unwrap();

    assert_eq!(evm.stack.stack, vec![U256::zero()]);
    // Only the CREATE fee was spent; no memory was touched.
    assert_eq!(evm.gas_left, U256::from(TEST_GAS - 32000));
    assert_eq!(get_account(&db, default_target()).info.nonce, 0);
    assert!(evm.children.is_empty());
}

#[test]
fn create_collision_burns_the_transferred_gas() {
    let created = calculate_create_address(default_target(), 0).unwrap();
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        created,
        // Pre-existing nonce at the derived address.
        Account::new(U256::zero(), Bytes::new(), 1, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut evm = Evm::new(message_with_code(Bytes::new(), U256::from(TEST_GAS)));
    evm.stack.push(U256::zero()).unwrap(); // size
    evm.stack.push(U256::zero()).unwrap(); // offset
    evm.stack.push(U256::zero()).unwrap(); // endowment
    vm.op_create(&mut evm).unwrap();

    assert_eq!(evm.stack.stack, vec![U256::zero()]);
    // Everything after the CREATE fee moved to the stillborn child and burned.
    assert!(evm.gas_left.is_zero());
    // The nonce increment sticks.
    assert_eq!(get_account(&db, default_target()).info.nonce, 1);
    assert!(evm.children.is_empty());
}

#[test]
fn create_reverted_child_discards_the_contract() {
    // Init code that dies on an undefined opcode after writing memory.
    let init_code = Bytes::copy_from_slice(&[0xef]);
    let mut init_word = [0u8; 32];
    init_word[..init_code.len()].copy_from_slice(&init_code);

    let operations = [
        Operation::Push((32, U256::from_big_endian(&init_word))),
        Operation::Push((1, U256::zero())),
        Operation::Mstore,
        Operation::Push((1, U256::one())),
        Operation::Push((1, U256::zero())),
        Operation::Push((1, U256::zero())),
        Operation::Create,
        Operation::Stop,
    ];

    let env = Environment::default();
    let mut db = new_db();
    let mut vm = Vm::new(&env, &mut db);
    let evm = vm
        .process_message(message_with_ops(&operations, U256::from(TEST_GAS)))
        .unwrap();

    assert!(!evm.has_erred);
    assert_eq!(*evm.stack.stack.last().unwrap(), U256::zero());
    let created = calculate_create_address(default_target(), 0).unwrap();
    assert!(!get_account(&db, created).has_code_or_nonce());
    // The child burned the whole remaining budget.
    assert!(evm.gas_left.is_zero());
    assert_eq!(evm.children.len(), 1);
    assert!(evm.children[0].has_erred);
}

#[test]
fn selfdestruct_moves_the_balance_and_queues_deletion() {
    let beneficiary = Address::from_low_u64_be(0xfee);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        default_target(),
        Account::new(U256::from(100), Bytes::new(), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let evm = vm
        .process_message(message_with_ops(
            &[
                Operation::Push((20, address_to_word(beneficiary))),
                Operation::SelfDestruct,
            ],
            U256::from(TEST_GAS),
        ))
        .unwrap();

    assert!(!evm.has_erred);
    assert!(!evm.running);
    assert!(evm.accounts_to_delete.contains(&default_target()));
    assert_eq!(get_account(&db, beneficiary).info.balance, U256::from(100));
    assert_eq!(get_account(&db, default_target()).info.balance, U256::zero());
    // No gas charged at this fork beyond the push.
    assert_eq!(evm.gas_left, U256::from(TEST_GAS - 3));
}

#[test]
fn selfdestruct_to_self_zeroes_the_balance() {
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        default_target(),
        Account::new(U256::from(100), Bytes::new(), 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let evm = vm
        .process_message(message_with_ops(
            &[
                Operation::Push((20, address_to_word(default_target()))),
                Operation::SelfDestruct,
            ],
            U256::from(TEST_GAS),
        ))
        .unwrap();

    assert_eq!(get_account(&db, default_target()).info.balance, U256::zero());
    assert!(evm.accounts_to_delete.contains(&default_target()));
}

#[test]
fn selfdestruct_in_a_child_merges_into_the_parent_on_success() {
    let doomed = Address::from_low_u64_be(0xd00);
    let beneficiary = Address::from_low_u64_be(0xfee);
    let doomed_code = ops_to_bytecode(&[
        Operation::Push((20, address_to_word(beneficiary))),
        Operation::SelfDestruct,
    ]);
    let env = Environment::default();
    let mut db = new_db_with_accounts(HashMap::from([(
        doomed,
        Account::new(U256::from(9), doomed_code, 0, HashMap::new()),
    )]));
    let mut vm = Vm::new(&env, &mut db);

    let mut operations = call_args(10_000, doomed, 0, 0);
    operations.push(Operation::Call);
    operations.push(Operation::Stop);
    let evm = vm
        .process_message(message_with_ops(&operations, U256::from(TEST_GAS)))
        .unwrap();

    assert_eq!(*evm.stack.stack.last().unwrap(), U256::one());
    assert!(evm.accounts_to_delete.contains(&doomed));
    assert_eq!(get_account(&db, beneficiary).info.balance, U256::from(9));
}
