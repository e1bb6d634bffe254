//! Token registry for assets the pool supports.

use crate::address::{Address, AddressError};

/// Static metadata for a supported asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: &'static str,
    pub name: &'static str,
    /// Base-unit exponent: one whole unit equals 10^decimals base units.
    pub decimals: u8,
    /// Mint address for fungible tokens. `None` for the native asset.
    pub mint: Option<&'static str>,
}

impl Token {
    pub fn is_native(&self) -> bool {
        self.mint.is_none()
    }

    /// Parsed mint address, `None` for the native asset.
    pub fn mint_address(&self) -> Result<Option<Address>, AddressError> {
        self.mint.map(str::parse).transpose()
    }
}

pub const SOL: Token = Token {
    symbol: "SOL",
    name: "SOL",
    decimals: 9,
    mint: None,
};

pub const USDC: Token = Token {
    symbol: "USDC",
    name: "USDC",
    decimals: 6,
    mint: Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
};

pub const USDT: Token = Token {
    symbol: "USDT",
    name: "Tether USD",
    decimals: 6,
    mint: Some("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
};

/// Look up a token by its symbol.
pub fn by_symbol(symbol: &str) -> Option<&'static Token> {
    match symbol {
        "SOL" => Some(&SOL),
        "USDC" => Some(&USDC),
        "USDT" => Some(&USDT),
        _ => None,
    }
}
