//! Call data for the contracts a wallet typically drives.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    /// `MintableToken.mint`, callable only by the token's minter (the wallet).
    function mint(address account, uint256 amount);
}

pub fn mint_call_data(account: Address, amount: U256) -> Bytes {
    Bytes::from(mintCall { account, amount }.abi_encode())
}
