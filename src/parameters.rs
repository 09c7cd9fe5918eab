//! Machine-readable half of a Ricardian contract
use super::error::ValidationError;
use super::types::Incoterm;

/// Terms of a trade as agreed at contract formation.
///
/// Field names are part of the hashed canonical form and must not be renamed.
/// Once embedded in a contract these are never mutated, a change in terms is
/// a new contract.
#[derive(minicbor::Encode, minicbor::Decode, serde::Serialize, Debug, Clone, PartialEq)]
pub struct ContractParameters {
    #[n(0)]
    pub buyer_id: String,
    #[n(1)]
    pub seller_id: String,
    #[n(2)]
    pub listing_id: String,
    #[n(3)]
    pub commodity: String,
    #[n(4)]
    pub quantity_kg: f64,
    #[n(5)]
    pub price_per_kg_usd: f64,
    #[n(6)]
    pub incoterm: Incoterm,
}

impl ContractParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.buyer_id.is_empty() {
            return Err(ValidationError::MissingIdentifier("buyer_id"));
        }
        if self.seller_id.is_empty() {
            return Err(ValidationError::MissingIdentifier("seller_id"));
        }
        if self.listing_id.is_empty() {
            return Err(ValidationError::MissingIdentifier("listing_id"));
        }
        if self.buyer_id == self.seller_id {
            return Err(ValidationError::SelfDealing);
        }
        if self.commodity.trim().is_empty() {
            return Err(ValidationError::BlankCommodity);
        }
        positive("quantity_kg", self.quantity_kg)?;
        positive("price_per_kg_usd", self.price_per_kg_usd)?;

        Ok(())
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositive { field, value })
    }
}
