//! Service layer API for contract workflow operations
use super::config::ServiceConfig;
use super::content::{ContractContent, ContractTerms};
use super::contract::Contract;
use super::directory::Directory;
use super::error::ContractError;
use super::integrity::{self, IntegrityReport};
use super::store::ContractStore;
use super::types::{Listing, TimeStamp, User};
use super::utils::{CONTRACT_PREFIX, has_prefix, new_uuid_to_bech32};
use std::sync::Arc;
use tracing::{info, warn};

/// Called once a contract reaches SIGNED. Escrow funding will hang off this.
pub trait SettlementHook: Send + Sync {
    fn on_signed(&self, contract: &Contract);
}

/// Settlement is not wired up yet, signing stops at the record.
pub struct NoSettlement;

impl SettlementHook for NoSettlement {
    fn on_signed(&self, _: &Contract) {}
}

pub struct ContractService {
    instance: Arc<sled::Db>,
    contracts: ContractStore,
    directory: Directory,
    terms: ContractTerms,
    settlement: Box<dyn SettlementHook>,
}

impl ContractService {
    pub fn new(instance: Arc<sled::Db>, terms: ContractTerms) -> Result<Self, ContractError> {
        let contracts = ContractStore::open(&instance)?;
        let directory = Directory::open(&instance)?;

        Ok(Self {
            instance,
            contracts,
            directory,
            terms,
            settlement: Box::new(NoSettlement),
        })
    }

    /// Open the database named in `config` and build a service over it.
    pub fn open(config: &ServiceConfig) -> Result<Self, ContractError> {
        let db = sled::open(&config.database_path)?;
        info!(path = %config.database_path.display(), "contract database opened");
        Self::new(Arc::new(db), config.terms())
    }

    pub fn with_settlement_hook(mut self, hook: impl SettlementHook + 'static) -> Self {
        self.settlement = Box::new(hook);
        self
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// A buyer's offer on a listing, by id. Produces a DRAFT contract.
    pub fn create_contract_from_offer(
        &self,
        listing_id: &str,
        buyer_id: &str,
    ) -> Result<Contract, ContractError> {
        let listing = self.directory.get_listing(listing_id)?;
        let buyer = self.directory.get_user(buyer_id)?;

        self.create_contract_from_listing(&listing, &buyer)
    }

    /// A buyer's offer on an already resolved listing.
    pub fn create_contract_from_listing(
        &self,
        listing: &Listing,
        buyer: &User,
    ) -> Result<Contract, ContractError> {
        if !listing.is_active {
            return Err(ContractError::InvalidState(format!(
                "Listing {} is not active",
                listing.id
            )));
        }
        if listing.seller_id == buyer.id {
            return Err(ContractError::InvalidArgument(
                "Cannot make an offer on your own listing".to_string(),
            ));
        }

        let created_at = TimeStamp::new();
        let content = ContractContent::build(listing, buyer, &created_at, &self.terms);
        let contract_hash = integrity::contract_hash(&content.legal_prose, &content.parameters)?;

        let contract = Contract::draft(
            new_uuid_to_bech32(CONTRACT_PREFIX)?,
            content,
            contract_hash,
            created_at,
        );
        self.contracts.insert_new(&contract)?;

        info!(
            contract_id = %contract.id,
            listing_id = %contract.listing_id,
            contract_hash = %contract.contract_hash,
            "draft contract created"
        );
        Ok(contract)
    }

    /// The seller's digital signature: DRAFT to SIGNED.
    ///
    /// Concurrent acceptances of the same contract serialise in the store;
    /// exactly one moves it to SIGNED and the rest see SIGNED and fail.
    pub fn accept_contract(
        &self,
        contract_id: &str,
        actor_id: &str,
    ) -> Result<Contract, ContractError> {
        let signed = self
            .contracts
            .update(contract_id, |current| {
                current.accept(actor_id, TimeStamp::new())
            })
            .inspect_err(|e| warn!(contract_id, actor_id, error = %e, "contract acceptance refused"))?;

        info!(
            contract_id = %signed.id,
            contract_hash = %signed.contract_hash,
            "contract signed"
        );
        self.settlement.on_signed(&signed);

        Ok(signed)
    }

    pub fn get_contract(&self, contract_id: &str) -> Result<Contract, ContractError> {
        if !has_prefix(contract_id, CONTRACT_PREFIX) {
            return Err(ContractError::not_found("contract", contract_id));
        }

        self.contracts
            .get(contract_id)?
            .ok_or_else(|| ContractError::not_found("contract", contract_id))
    }

    /// Fetch a contract on behalf of `viewer_id`, who must be one of its parties.
    pub fn get_contract_for(
        &self,
        contract_id: &str,
        viewer_id: &str,
    ) -> Result<Contract, ContractError> {
        let contract = self.get_contract(contract_id)?;
        contract.ensure_viewable_by(viewer_id)?;
        Ok(contract)
    }

    /// Recompute a stored contract's hash and compare it with the stored one.
    pub fn verify_contract(&self, contract_id: &str) -> Result<IntegrityReport, ContractError> {
        let contract = self.get_contract(contract_id)?;
        let report = integrity::verify(&contract)?;

        if !report.is_intact() {
            warn!(
                contract_id,
                stored = %report.stored_hash,
                computed = %report.computed_hash,
                "contract hash mismatch"
            );
        }
        Ok(report)
    }

    pub fn contracts_for_party(&self, user_id: &str) -> Result<Vec<Contract>, ContractError> {
        Ok(self.contracts.for_party(user_id)?)
    }

    pub fn flush(&self) -> Result<usize, ContractError> {
        Ok(self.instance.flush()?)
    }
}
