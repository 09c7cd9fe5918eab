//! Identifier helpers

use super::error::IdentifierError;
use bech32::Bech32m;
use uuid7::uuid7;

pub const CONTRACT_PREFIX: &str = "contract_";
pub const USER_PREFIX: &str = "user_";
pub const LISTING_PREFIX: &str = "listing_";

// construct a unique id then encode using bech32m, uuid7 keeps ids time ordered before encoding
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String, IdentifierError> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// True when `id` decodes as bech32 and carries the given human readable prefix.
pub fn has_prefix(id: &str, hrp: &str) -> bool {
    match bech32::decode(id) {
        Ok((decoded, _)) => decoded.as_str().eq_ignore_ascii_case(hrp),
        Err(_) => false,
    }
}
