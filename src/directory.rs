//! Users and listings, the records contract formation reads from
use super::error::{ContractError, StoreError, ValidationError};
use super::parameters::positive;
use super::types::{Listing, NewListing, User, UserTier};
use super::utils::{LISTING_PREFIX, USER_PREFIX, new_uuid_to_bech32};
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
};
use sled::{Transactional, Tree};
use tracing::{debug, info};

pub const USERS_TREE: &str = "users";
pub const PHONES_TREE: &str = "phone_numbers";
pub const LISTINGS_TREE: &str = "listings";

pub const MAX_COMMODITY_NAME: usize = 100;
pub const MAX_LOCATION_LGA: usize = 100;
pub const MAX_LOCATION_STATE: usize = 50;

pub struct Directory {
    users: Tree,
    phones: Tree, // phone number -> user id, enforces uniqueness
    listings: Tree,
}

impl Directory {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            users: db.open_tree(USERS_TREE)?,
            phones: db.open_tree(PHONES_TREE)?,
            listings: db.open_tree(LISTINGS_TREE)?,
        })
    }

    /// Register a user. Phone numbers are unique across the marketplace.
    pub fn register_user(&self, phone_number: &str, tier: UserTier) -> Result<User, ContractError> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(ValidationError::BlankPhoneNumber.into());
        }

        let user = User {
            id: new_uuid_to_bech32(USER_PREFIX)?,
            phone_number: phone_number.to_string(),
            is_active: true,
            tier,
        };

        let cbor = minicbor::to_vec(&user)?;

        // the phone claim and the user record land together or not at all
        (&self.phones, &self.users)
            .transaction(|(phones, users)| -> ConflictableTransactionResult<(), ContractError> {
                if phones.get(phone_number.as_bytes())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(
                        ContractError::InvalidArgument(
                            "phone number is already registered".to_string(),
                        ),
                    ));
                }
                phones.insert(phone_number.as_bytes(), user.id.as_bytes())?;
                users.insert(user.id.as_bytes(), cbor.as_slice())?;
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => ContractError::from(e),
            })?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub fn get_user(&self, user_id: &str) -> Result<User, ContractError> {
        match self.users.get(user_id.as_bytes())? {
            Some(raw) => Ok(minicbor::decode(&raw)?),
            None => Err(ContractError::not_found("user", user_id)),
        }
    }

    /// Put a commodity on the market for `seller_id`.
    pub fn create_listing(
        &self,
        seller_id: &str,
        listing: NewListing,
    ) -> Result<Listing, ContractError> {
        let seller = self.get_user(seller_id)?;

        let commodity_name = listing.commodity_name.trim();
        if commodity_name.is_empty() {
            return Err(ValidationError::BlankCommodity.into());
        }
        let len = commodity_name.chars().count();
        if len > MAX_COMMODITY_NAME {
            return Err(ValidationError::CommodityTooLong {
                len,
                max: MAX_COMMODITY_NAME,
            }
            .into());
        }
        positive("quantity_kg", listing.quantity_kg)?;
        positive("price_per_kg_usd", listing.price_per_kg_usd)?;
        at_most("location_lga", &listing.location_lga, MAX_LOCATION_LGA)?;
        at_most("location_state", &listing.location_state, MAX_LOCATION_STATE)?;

        let listing = Listing {
            id: new_uuid_to_bech32(LISTING_PREFIX)?,
            seller_id: seller.id,
            commodity_name: commodity_name.to_string(),
            quantity_kg: listing.quantity_kg,
            price_per_kg_usd: listing.price_per_kg_usd,
            location_lga: listing.location_lga,
            location_state: listing.location_state,
            incoterm: listing.incoterm,
            notes: listing.notes,
            is_active: true,
        };

        self.listings
            .insert(listing.id.as_bytes(), minicbor::to_vec(&listing)?)?;

        info!(listing_id = %listing.id, seller_id = %listing.seller_id, "listing created");
        Ok(listing)
    }

    pub fn get_listing(&self, listing_id: &str) -> Result<Listing, ContractError> {
        match self.listings.get(listing_id.as_bytes())? {
            Some(raw) => Ok(minicbor::decode(&raw)?),
            None => Err(ContractError::not_found("listing", listing_id)),
        }
    }

    /// Active listings in key order, paginated.
    pub fn active_listings(&self, skip: usize, limit: usize) -> Result<Vec<Listing>, StoreError> {
        self.listings
            .iter()
            .values()
            .map(|raw| -> Result<Listing, StoreError> { Ok(minicbor::decode(&raw?)?) })
            .filter(|listing| !matches!(listing, Ok(l) if !l.is_active))
            .skip(skip)
            .take(limit)
            .collect()
    }

    /// Withdraw a listing from the market. Only its seller may do this.
    pub fn deactivate_listing(
        &self,
        listing_id: &str,
        actor_id: &str,
    ) -> Result<Listing, ContractError> {
        let mut listing = self.get_listing(listing_id)?;
        if listing.seller_id != actor_id {
            return Err(ContractError::Forbidden(
                "Only the seller can withdraw the listing".to_string(),
            ));
        }

        listing.is_active = false;
        self.listings
            .insert(listing.id.as_bytes(), minicbor::to_vec(&listing)?)?;

        debug!(listing_id, "listing deactivated");
        Ok(listing)
    }
}

fn at_most(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::FieldTooLong { field, len, max });
    }
    Ok(())
}
