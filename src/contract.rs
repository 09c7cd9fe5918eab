//! The Ricardian contract record and its lifecycle rules
use super::content::ContractContent;
use super::error::ContractError;
use super::parameters::ContractParameters;
use super::types::TimeStamp;
use chrono::Utc;
use std::fmt;

#[derive(
    minicbor::Encode, minicbor::Decode, serde::Serialize, Debug, Clone, Copy, Eq, PartialEq,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    #[n(0)]
    Draft, // offer made, awaiting the seller
    #[n(1)]
    Signed, // seller countersigned, content locked
    #[n(2)]
    InProgress,
    #[n(3)]
    Completed,
    #[n(4)]
    Disputed,
    #[n(5)]
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "DRAFT",
            ContractStatus::Signed => "SIGNED",
            ContractStatus::InProgress => "IN_PROGRESS",
            ContractStatus::Completed => "COMPLETED",
            ContractStatus::Disputed => "DISPUTED",
            ContractStatus::Cancelled => "CANCELLED",
        }
    }
    /// Where `event` takes a contract in this status, if anywhere.
    pub fn next(self, event: ContractEvent) -> Option<ContractStatus> {
        TRANSITIONS
            .iter()
            .find(|(from, on, _)| *from == self && *on == event)
            .map(|(_, _, to)| *to)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ContractEvent {
    SellerAccepts,
}

// IN_PROGRESS, COMPLETED, DISPUTED and CANCELLED have no entry yet
const TRANSITIONS: &[(ContractStatus, ContractEvent, ContractStatus)] = &[(
    ContractStatus::Draft,
    ContractEvent::SellerAccepts,
    ContractStatus::Signed,
)];

/// A contract as persisted. Prose, parameters and hash are write-once.
#[derive(minicbor::Encode, minicbor::Decode, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Contract {
    #[n(0)]
    pub id: String, // bech32m, prefix `contract_`
    #[n(1)]
    pub status: ContractStatus,
    #[n(2)]
    pub legal_prose: String,
    #[n(3)]
    pub parameters: ContractParameters,
    #[n(4)]
    pub contract_hash: String,
    #[n(5)]
    pub on_chain_id: Option<String>, // set by a future anchoring step
    #[n(6)]
    pub buyer_id: String,
    #[n(7)]
    pub seller_id: String,
    #[n(8)]
    pub listing_id: String,
    #[n(9)]
    pub created_at: TimeStamp<Utc>,
    #[n(10)]
    pub updated_at: TimeStamp<Utc>,
}

impl Contract {
    pub fn draft(
        id: String,
        content: ContractContent,
        contract_hash: String,
        created_at: TimeStamp<Utc>,
    ) -> Self {
        let ContractContent {
            legal_prose,
            parameters,
        } = content;

        Self {
            id,
            status: ContractStatus::Draft,
            buyer_id: parameters.buyer_id.clone(),
            seller_id: parameters.seller_id.clone(),
            listing_id: parameters.listing_id.clone(),
            legal_prose,
            parameters,
            contract_hash,
            on_chain_id: None,
            updated_at: created_at.clone(),
            created_at,
        }
    }

    /// True when `other` carries the same write-once fields as `self`.
    /// Only `status`, `on_chain_id` and `updated_at` may differ.
    pub fn same_content(&self, other: &Contract) -> bool {
        self.id == other.id
            && self.legal_prose == other.legal_prose
            && self.parameters == other.parameters
            && self.contract_hash == other.contract_hash
            && self.buyer_id == other.buyer_id
            && self.seller_id == other.seller_id
            && self.listing_id == other.listing_id
            && self.created_at == other.created_at
    }

    pub fn is_party(&self, user_id: &str) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }

    /// Only the buyer or the seller may see a contract.
    pub fn ensure_viewable_by(&self, viewer_id: &str) -> Result<(), ContractError> {
        if self.is_party(viewer_id) {
            Ok(())
        } else {
            Err(ContractError::Forbidden(
                "Not authorized to view this contract".to_string(),
            ))
        }
    }

    /// The seller's countersignature. Returns the SIGNED record, `self` is untouched.
    ///
    /// Ownership is checked before state, so a non-seller is refused whatever
    /// the status.
    pub fn accept(&self, actor_id: &str, at: TimeStamp<Utc>) -> Result<Contract, ContractError> {
        if self.seller_id != actor_id {
            return Err(ContractError::Forbidden(
                "Only the seller can accept the contract".to_string(),
            ));
        }

        let status = self
            .status
            .next(ContractEvent::SellerAccepts)
            .ok_or_else(|| ContractError::cannot_accept(self.status))?;

        let mut signed = self.clone();
        signed.status = status;
        signed.updated_at = at;
        Ok(signed)
    }
}
