//! Legal prose and parameter generation for new contracts
use super::parameters::ContractParameters;
use super::types::{Listing, TimeStamp, User};
use chrono::Utc;

/// Jurisdiction and platform named in every contract's prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTerms {
    pub governing_law: String,
    pub platform_name: String,
}

impl Default for ContractTerms {
    fn default() -> Self {
        Self {
            governing_law: "Nigeria".to_string(),
            platform_name: "Farmily TRACE".to_string(),
        }
    }
}

/// The write-once content of a contract, produced exactly once per offer.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractContent {
    pub legal_prose: String,
    pub parameters: ContractParameters,
}

impl ContractContent {
    /// Render content for an offer by `buyer` on `listing`.
    ///
    /// Pure: the creation date is the only input that varies between calls
    /// for the same listing and buyer, and it is passed in. Listing state and
    /// self-dealing are checked by the caller before this runs.
    pub fn build(
        listing: &Listing,
        buyer: &User,
        created_at: &TimeStamp<Utc>,
        terms: &ContractTerms,
    ) -> Self {
        let parameters = ContractParameters {
            buyer_id: buyer.id.clone(),
            seller_id: listing.seller_id.clone(),
            listing_id: listing.id.clone(),
            commodity: listing.commodity_name.clone(),
            quantity_kg: listing.quantity_kg,
            price_per_kg_usd: listing.price_per_kg_usd,
            incoterm: listing.incoterm,
        };
        let legal_prose = render_prose(&parameters, created_at, terms);

        Self {
            legal_prose,
            parameters,
        }
    }
}

pub fn render_prose(
    params: &ContractParameters,
    created_at: &TimeStamp<Utc>,
    terms: &ContractTerms,
) -> String {
    let lines = [
        "--- LEGAL TRADE AGREEMENT ---".to_string(),
        format!("This contract is made on {}.", created_at.date_stamp()),
        String::new(),
        "PARTIES:".to_string(),
        format!("- Seller ID: {}", params.seller_id),
        format!("- Buyer ID: {}", params.buyer_id),
        String::new(),
        "TERMS:".to_string(),
        format!("- Commodity: {}", params.commodity),
        format!("- Quantity: {} kg", decimal(params.quantity_kg)),
        format!("- Price: USD ${}/kg", decimal(params.price_per_kg_usd)),
        format!("- Incoterm: {}", params.incoterm),
        String::new(),
        format!(
            "This agreement is governed by the laws of {}. Both parties agree to the",
            terms.governing_law
        ),
        format!(
            "terms and conditions as laid out on the {} platform. Digital acceptance",
            terms.platform_name
        ),
        "of this contract constitutes a legally binding signature.".to_string(),
    ];

    lines.join("\n")
}

// Debug keeps the fractional part on whole numbers (500.0, not 500)
fn decimal(value: f64) -> String {
    format!("{value:?}")
}
