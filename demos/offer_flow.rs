use anyhow::Context;
use trace_contracts::{
    ContractService,
    config::ServiceConfig,
    types::{Incoterm, NewListing, UserTier},
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // a scratch database unless TRACE_DATABASE_PATH says otherwise
    let temp_dir = tempfile::tempdir()?;
    let mut config = ServiceConfig::from_env()?;
    if std::env::var_os("TRACE_DATABASE_PATH").is_none() {
        config = config.with_database_path(temp_dir.path().join("trace.db"));
    }
    let service = ContractService::open(&config)?;

    let seller = service
        .directory()
        .register_user("+2348011111111", UserTier::Tier1)?;
    let buyer = service
        .directory()
        .register_user("+2348022222222", UserTier::Tier0)?;

    let listing = service.directory().create_listing(
        &seller.id,
        NewListing::new("Dried Ginger", 500.0, 3.2)
            .set_location("Kachia", "Kaduna")
            .set_incoterm(Incoterm::EXW),
    )?;

    let draft = service
        .create_contract_from_offer(&listing.id, &buyer.id)
        .context("offer failed")?;
    println!("{}\n", draft.legal_prose);

    let signed = service
        .accept_contract(&draft.id, &seller.id)
        .context("acceptance failed")?;
    println!("{}", serde_json::to_string_pretty(&signed)?);

    let report = service.verify_contract(&signed.id)?;
    println!("intact: {}", report.is_intact());

    service.flush()?;
    Ok(())
}
