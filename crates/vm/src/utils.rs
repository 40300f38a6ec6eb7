use crate::{
    account::Account,
    db::{cache, GeneralizedDatabase},
    errors::{InternalError, VMError},
};
use ethereum_types::{Address, U256};
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

pub fn word_to_address(word: U256) -> Address {
    let bytes = word.to_big_endian();
    Address::from_slice(&bytes[12..])
}

pub fn address_to_word(address: Address) -> U256 {
    U256::from_big_endian(address.as_bytes())
}

/// Reads an account through the overlay. Absent accounts read as empty.
pub fn get_account(db: &GeneralizedDatabase, address: Address) -> Account {
    match cache::get_account(&db.cache, &address) {
        Some(account) => account.clone(),
        None => db.store.get_account(address),
    }
}

/// Mutable access to an account, materializing it in the overlay first.
pub fn get_account_mut(db: &mut GeneralizedDatabase, address: Address) -> &mut Account {
    if !cache::is_account_cached(&db.cache, &address) {
        let account = db.store.get_account(address);
        cache::insert_account(&mut db.cache, address, account);
    }
    // The entry was just inserted if it was missing.
    db.cache.entry(address).or_default()
}

pub fn account_exists(db: &GeneralizedDatabase, address: Address) -> bool {
    cache::is_account_cached(&db.cache, &address) || db.store.account_exists(address)
}

pub fn account_has_code_or_nonce(db: &GeneralizedDatabase, address: Address) -> bool {
    get_account(db, address).has_code_or_nonce()
}

pub fn increment_account_nonce(
    db: &mut GeneralizedDatabase,
    address: Address,
) -> Result<(), VMError> {
    let account = get_account_mut(db, address);
    account.info.nonce = account
        .info
        .nonce
        .checked_add(1)
        .ok_or(InternalError::ArithmeticOperationOverflow)?;
    Ok(())
}

pub fn set_account_balance(db: &mut GeneralizedDatabase, address: Address, balance: U256) {
    get_account_mut(db, address).info.balance = balance;
}

pub fn increase_account_balance(
    db: &mut GeneralizedDatabase,
    address: Address,
    amount: U256,
) -> Result<(), VMError> {
    let account = get_account_mut(db, address);
    account.info.balance = account
        .info
        .balance
        .checked_add(amount)
        .ok_or(VMError::BalanceOverflow)?;
    Ok(())
}

pub fn decrease_account_balance(
    db: &mut GeneralizedDatabase,
    address: Address,
    amount: U256,
) -> Result<(), VMError> {
    let account = get_account_mut(db, address);
    account.info.balance = account
        .info
        .balance
        .checked_sub(amount)
        .ok_or(VMError::BalanceUnderflow)?;
    Ok(())
}

/// Moves `value` wei. Debiting before crediting makes a self-transfer a net
/// no-op.
pub fn transfer(
    db: &mut GeneralizedDatabase,
    from: Address,
    to: Address,
    value: U256,
) -> Result<(), VMError> {
    decrease_account_balance(db, from, value)?;
    increase_account_balance(db, to, value)
}

/// Address of a contract created by `sender` at `nonce`:
/// `keccak256(rlp([sender, nonce]))[12..]`.
pub fn calculate_create_address(sender: Address, nonce: u64) -> Result<Address, VMError> {
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender);
    stream.append(&nonce);
    let hash = Keccak256::digest(stream.out());
    let bytes = hash
        .get(12..)
        .ok_or(InternalError::CouldNotComputeCreateAddress)?;
    Ok(Address::from_slice(bytes))
}
