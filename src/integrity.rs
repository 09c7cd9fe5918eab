//! Tamper evidence for contract content
//!
//! The digest is sha256 over the prose bytes followed by the canonical
//! parameter bytes, rendered as 64 lowercase hex characters. Stored prose
//! carries the creation date, so verification always hashes the stored
//! prose as-is and never regenerates it.
use super::canonical::CanonicalParameters;
use super::contract::Contract;
use super::error::ContractError;
use super::parameters::ContractParameters;

pub const HASH_HEX_LEN: usize = 64;

pub fn contract_hash(
    legal_prose: &str,
    parameters: &ContractParameters,
) -> Result<String, ContractError> {
    if legal_prose.trim().is_empty() {
        return Err(ContractError::InvalidArgument(
            "legal prose is empty".to_string(),
        ));
    }
    parameters.validate()?;

    let canonical = CanonicalParameters::new(parameters)?;

    let mut contents = Vec::with_capacity(legal_prose.len() + canonical.as_bytes().len());
    contents.extend_from_slice(legal_prose.as_bytes());
    contents.extend_from_slice(canonical.as_bytes());

    Ok(sha256::digest(contents.as_slice()))
}

/// True for a 64 character lowercase hex string.
pub fn is_well_formed(hash: &str) -> bool {
    hash.len() == HASH_HEX_LEN
        && !hash.bytes().any(|b| b.is_ascii_uppercase())
        && hex::decode(hash).is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IntegrityReport {
    pub contract_id: String,
    pub stored_hash: String,
    pub computed_hash: String,
}

impl IntegrityReport {
    pub fn is_intact(&self) -> bool {
        self.stored_hash == self.computed_hash
    }
}

/// Recompute the digest from what is stored and compare.
pub fn verify(contract: &Contract) -> Result<IntegrityReport, ContractError> {
    let computed_hash = contract_hash(&contract.legal_prose, &contract.parameters)?;

    Ok(IntegrityReport {
        contract_id: contract.id.clone(),
        stored_hash: contract.contract_hash.clone(),
        computed_hash,
    })
}
