use crate::{account::Account, db::CacheDB};
use ethereum_types::Address;

pub fn get_account<'cache>(cache: &'cache CacheDB, address: &Address) -> Option<&'cache Account> {
    cache.get(address)
}

pub fn get_account_mut<'cache>(
    cache: &'cache mut CacheDB,
    address: &Address,
) -> Option<&'cache mut Account> {
    cache.get_mut(address)
}

pub fn insert_account(cache: &mut CacheDB, address: Address, account: Account) {
    cache.insert(address, account);
}

pub fn remove_account(cache: &mut CacheDB, address: &Address) {
    cache.remove(address);
}

pub fn is_account_cached(cache: &CacheDB, address: &Address) -> bool {
    cache.contains_key(address)
}
