//! Durable contract records in sled.
//!
//! Records are CBOR encoded and keyed by contract id. Every write is a
//! compare-and-swap against the bytes last read, so two writers racing on the
//! same contract can never both succeed: the loser re-reads and re-runs its
//! guards against what the winner stored.
use super::contract::Contract;
use super::error::{ContractError, StoreError};
use sled::{IVec, Tree};
use tracing::debug;

pub const CONTRACTS_TREE: &str = "contracts";

pub struct ContractStore {
    tree: Tree,
}

impl ContractStore {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(CONTRACTS_TREE)?,
        })
    }

    /// Insert a contract that must not exist yet.
    pub fn insert_new(&self, contract: &Contract) -> Result<(), ContractError> {
        let cbor = minicbor::to_vec(contract)?;

        match self
            .tree
            .compare_and_swap(contract.id.as_bytes(), None as Option<&[u8]>, Some(cbor))?
        {
            Ok(()) => {
                debug!(contract_id = %contract.id, "contract record inserted");
                Ok(())
            }
            Err(_) => Err(ContractError::InvalidState(format!(
                "contract {} already exists",
                contract.id
            ))),
        }
    }

    pub fn get(&self, contract_id: &str) -> Result<Option<Contract>, StoreError> {
        Ok(self.load(contract_id)?.map(|(_, contract)| contract))
    }

    /// Atomically replace a contract with the result of `apply`.
    ///
    /// `apply` sees the current record and either refuses (the error is
    /// returned as-is) or returns the replacement. If another writer got in
    /// between the read and the swap, `apply` runs again on the fresh record.
    ///
    /// A replacement that touches the prose, parameters, hash, parties or
    /// creation time is refused with `InvalidState`.
    pub fn update<F>(&self, contract_id: &str, apply: F) -> Result<Contract, ContractError>
    where
        F: Fn(&Contract) -> Result<Contract, ContractError>,
    {
        loop {
            let (raw, current) = self
                .load(contract_id)?
                .ok_or_else(|| ContractError::not_found("contract", contract_id))?;

            let next = apply(&current)?;
            if !current.same_content(&next) {
                return Err(ContractError::InvalidState(format!(
                    "contract {contract_id} content is locked"
                )));
            }
            let cbor = minicbor::to_vec(&next)?;

            match self
                .tree
                .compare_and_swap(contract_id.as_bytes(), Some(raw), Some(cbor))?
            {
                Ok(()) => return Ok(next),
                Err(_) => {
                    debug!(contract_id, "contract changed underneath update, retrying");
                }
            }
        }
    }

    /// Every stored contract naming `user_id` as buyer or seller, in key order.
    pub fn for_party(&self, user_id: &str) -> Result<Vec<Contract>, StoreError> {
        let mut contracts = vec![];
        for entry in self.tree.iter() {
            let (_, value) = entry?;
            let contract: Contract = minicbor::decode(&value)?;
            if contract.is_party(user_id) {
                contracts.push(contract);
            }
        }
        Ok(contracts)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn load(&self, contract_id: &str) -> Result<Option<(IVec, Contract)>, StoreError> {
        match self.tree.get(contract_id.as_bytes())? {
            Some(raw) => {
                let contract: Contract = minicbor::decode(&raw)?;
                Ok(Some((raw, contract)))
            }
            None => Ok(None),
        }
    }
}
