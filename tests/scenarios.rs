use anyhow::Context;
use sled::open;
use std::sync::{Arc, Mutex};
use trace_contracts::{
    ContractError, ContractService, ContractStatus,
    content::ContractTerms,
    contract::Contract,
    integrity,
    service::SettlementHook,
    types::{Incoterm, Listing, NewListing, User, UserTier},
};

use tempfile::{TempDir, tempdir}; // Use for test db cleanup.

// Sled locks its directory, so every test gets a fresh database under a
// temp dir. The dir is returned so it outlives the service.
fn service(name: &str) -> anyhow::Result<(TempDir, ContractService)> {
    let temp_dir = tempdir()?;
    let db = open(temp_dir.path().join(name))?;
    let service = ContractService::new(Arc::new(db), ContractTerms::default())?;
    Ok((temp_dir, service))
}

fn ginger_listing(service: &ContractService, seller: &User) -> anyhow::Result<Listing> {
    let listing = service.directory().create_listing(
        &seller.id,
        NewListing::new("Dried Ginger", 500.0, 3.2)
            .set_location("Kachia", "Kaduna")
            .set_incoterm(Incoterm::EXW),
    )?;
    Ok(listing)
}

#[test]
fn offer_then_accept() -> anyhow::Result<()> {
    let (_dir, service) = service("offer_then_accept.db")?;

    let seller = service
        .directory()
        .register_user("+2348011111111", UserTier::Tier1)?;
    let buyer = service
        .directory()
        .register_user("+2348022222222", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;

    let draft = service
        .create_contract_from_offer(&listing.id, &buyer.id)
        .context("Contract Failed on Offer: ")?;

    assert_eq!(draft.status, ContractStatus::Draft);
    assert_eq!(draft.parameters.commodity, "Dried Ginger");
    assert_eq!(draft.parameters.quantity_kg, 500.0);
    assert_eq!(draft.buyer_id, buyer.id);
    assert_eq!(draft.seller_id, seller.id);
    assert!(integrity::is_well_formed(&draft.contract_hash));

    // with the draft stored the seller can countersign
    let signed = service
        .accept_contract(&draft.id, &seller.id)
        .context("Contract Failed on Accept: ")?;

    assert_eq!(signed.status, ContractStatus::Signed);
    assert_eq!(signed.legal_prose, draft.legal_prose);
    assert_eq!(signed.parameters, draft.parameters);
    assert_eq!(signed.contract_hash, draft.contract_hash);

    let err = service.accept_contract(&draft.id, &seller.id).unwrap_err();
    match err {
        ContractError::InvalidState(msg) => assert!(msg.contains("SIGNED")),
        other => panic!("expected InvalidState, got {other:?}"),
    }

    assert_eq!(service.get_contract(&draft.id)?, signed);

    Ok(())
}

#[test]
fn stored_contract_verifies() -> anyhow::Result<()> {
    let (_dir, service) = service("stored_contract_verifies.db")?;

    let seller = service.directory().register_user("0801", UserTier::Tier0)?;
    let buyer = service.directory().register_user("0802", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;

    let draft = service.create_contract_from_offer(&listing.id, &buyer.id)?;
    assert!(service.verify_contract(&draft.id)?.is_intact());

    service.accept_contract(&draft.id, &seller.id)?;
    let report = service.verify_contract(&draft.id)?;
    assert!(report.is_intact());
    assert_eq!(report.stored_hash, draft.contract_hash);

    Ok(())
}

#[test]
fn buyer_cannot_accept_and_record_is_unchanged() -> anyhow::Result<()> {
    let (_dir, service) = service("buyer_cannot_accept.db")?;

    let seller = service.directory().register_user("0803", UserTier::Tier0)?;
    let buyer = service.directory().register_user("0804", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;
    let draft = service.create_contract_from_offer(&listing.id, &buyer.id)?;

    let err = service.accept_contract(&draft.id, &buyer.id).unwrap_err();
    assert!(matches!(err, ContractError::Forbidden(_)));

    assert_eq!(service.get_contract(&draft.id)?, draft);

    Ok(())
}

#[test]
fn self_offer_creates_nothing() -> anyhow::Result<()> {
    let (_dir, service) = service("self_offer.db")?;

    let seller = service.directory().register_user("0805", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;

    let err = service
        .create_contract_from_offer(&listing.id, &seller.id)
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidArgument(_)));
    assert!(service.contracts_for_party(&seller.id)?.is_empty());

    Ok(())
}

#[test]
fn inactive_listing_is_refused() -> anyhow::Result<()> {
    let (_dir, service) = service("inactive_listing.db")?;

    let seller = service.directory().register_user("0806", UserTier::Tier0)?;
    let buyer = service.directory().register_user("0807", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;
    service
        .directory()
        .deactivate_listing(&listing.id, &seller.id)?;

    let err = service
        .create_contract_from_offer(&listing.id, &buyer.id)
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidState(_)));

    Ok(())
}

#[test]
fn unknown_records_are_not_found() -> anyhow::Result<()> {
    let (_dir, service) = service("not_found.db")?;

    let buyer = service.directory().register_user("0808", UserTier::Tier0)?;

    assert!(matches!(
        service.create_contract_from_offer("listing_missing", &buyer.id),
        Err(ContractError::NotFound { kind: "listing", .. })
    ));

    let seller = service.directory().register_user("0820", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;
    assert!(matches!(
        service.create_contract_from_offer(&listing.id, "user_missing"),
        Err(ContractError::NotFound { kind: "user", .. })
    ));
    assert!(service.contracts_for_party(&seller.id)?.is_empty());
    assert!(matches!(
        service.get_contract("nonsense"),
        Err(ContractError::NotFound { kind: "contract", .. })
    ));

    let missing = trace_contracts::utils::new_uuid_to_bech32("contract_")?;
    assert!(matches!(
        service.accept_contract(&missing, &buyer.id),
        Err(ContractError::NotFound { .. })
    ));

    Ok(())
}

#[test]
fn only_parties_can_view() -> anyhow::Result<()> {
    let (_dir, service) = service("only_parties_view.db")?;

    let seller = service.directory().register_user("0809", UserTier::Tier0)?;
    let buyer = service.directory().register_user("0810", UserTier::Tier0)?;
    let outsider = service.directory().register_user("0811", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;
    let draft = service.create_contract_from_offer(&listing.id, &buyer.id)?;

    assert_eq!(service.get_contract_for(&draft.id, &buyer.id)?, draft);
    assert_eq!(service.get_contract_for(&draft.id, &seller.id)?, draft);
    assert!(matches!(
        service.get_contract_for(&draft.id, &outsider.id),
        Err(ContractError::Forbidden(_))
    ));

    Ok(())
}

#[test]
fn concurrent_accepts_sign_once() -> anyhow::Result<()> {
    let (_dir, service) = service("concurrent_accepts.db")?;
    let service = Arc::new(service);

    let seller = service.directory().register_user("0812", UserTier::Tier0)?;
    let buyer = service.directory().register_user("0813", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;
    let draft = service.create_contract_from_offer(&listing.id, &buyer.id)?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let contract_id = draft.id.clone();
            let seller_id = seller.id.clone();
            std::thread::spawn(move || service.accept_contract(&contract_id, &seller_id))
        })
        .collect();

    let mut signed = 0;
    for handle in handles {
        match handle.join().expect("accept thread panicked") {
            Ok(contract) => {
                assert_eq!(contract.status, ContractStatus::Signed);
                signed += 1;
            }
            Err(ContractError::InvalidState(msg)) => assert!(msg.contains("SIGNED")),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(signed, 1);

    Ok(())
}

struct RecordingSettlement(Arc<Mutex<Vec<String>>>);

impl SettlementHook for RecordingSettlement {
    fn on_signed(&self, contract: &Contract) {
        self.0.lock().unwrap().push(contract.id.clone());
    }
}

#[test]
fn settlement_hook_sees_signed_contracts() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let db = open(temp_dir.path().join("settlement_hook.db"))?;
    let seen = Arc::new(Mutex::new(vec![]));
    let service = ContractService::new(Arc::new(db), ContractTerms::default())?
        .with_settlement_hook(RecordingSettlement(Arc::clone(&seen)));

    let seller = service.directory().register_user("0814", UserTier::Tier0)?;
    let buyer = service.directory().register_user("0815", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;
    let draft = service.create_contract_from_offer(&listing.id, &buyer.id)?;

    assert!(seen.lock().unwrap().is_empty());
    service.accept_contract(&draft.id, &seller.id)?;
    assert_eq!(*seen.lock().unwrap(), vec![draft.id.clone()]);

    Ok(())
}

#[test]
fn party_listing_finds_both_sides() -> anyhow::Result<()> {
    let (_dir, service) = service("party_listing.db")?;

    let seller = service.directory().register_user("0816", UserTier::Tier0)?;
    let buyer_a = service.directory().register_user("0817", UserTier::Tier0)?;
    let buyer_b = service.directory().register_user("0818", UserTier::Tier0)?;
    let listing = ginger_listing(&service, &seller)?;

    service.create_contract_from_offer(&listing.id, &buyer_a.id)?;
    service.create_contract_from_offer(&listing.id, &buyer_b.id)?;

    assert_eq!(service.contracts_for_party(&seller.id)?.len(), 2);
    assert_eq!(service.contracts_for_party(&buyer_a.id)?.len(), 1);
    assert_eq!(service.contracts_for_party(&buyer_b.id)?.len(), 1);

    Ok(())
}
