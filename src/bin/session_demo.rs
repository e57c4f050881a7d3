/// Walks one session through its lifecycle against the in-process store,
/// using a manual clock so the grace window can be crossed instantly.
///
/// $ cargo run --bin session_demo
use cadence::application_impl::RealSessionService;
use cadence::application_port::{SessionConfig, SessionService};
use cadence::domain_model::{SessionIdentity, SessionKeyspace};
use cadence::infra_memory::{ManualClock, MemorySessionStore};
use cadence::logger::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    logger.reload_from_config(&LogConfig {
        filter: "session_demo=debug,cadence=debug".to_string(),
    })?;

    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(MemorySessionStore::new(clock.clone()));
    let config = SessionConfig::new(SessionKeyspace::new("demo", "session:user"), 3600);
    let service = RealSessionService::new(store, config)?;

    let identity = SessionIdentity::new("alice").with_authority("ROLE_ADMIN");
    let token = service.generate(&identity).await?;
    info!("generated: {}", service.config().token_head.apply(&token));

    let found = service.lookup_identity(token.as_str()).await?;
    debug!("lookup: {:?}", found);
    debug!(
        "validate as alice: {}",
        service.validate(token.as_str(), &SessionIdentity::new("alice")).await?
    );

    clock.advance(100);
    let same = service.refresh(token.as_str()).await?;
    info!("refresh at t=100: {:?} (same: {})", same, same.as_ref() == Some(&token));

    clock.advance(1900);
    let fresh = service.refresh(token.as_str()).await?;
    info!("refresh at t=2000: {:?}", fresh);
    info!(
        "old token ttl: {}s",
        service.remaining_ttl(token.as_str()).await?
    );

    clock.advance(1600);
    info!(
        "old token expired at t=3600: {}",
        service.is_expired(token.as_str()).await?
    );
    info!(
        "refresh of expired token: {:?}",
        service.refresh(token.as_str()).await?
    );

    Ok(())
}
