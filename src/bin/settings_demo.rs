/// Prints the effective session settings and the store keys they produce.
///
/// Any value can be overridden from the environment:
/// $ CADENCE_SESSION__EXPIRE_SECS=600 CADENCE_STORE__BACKEND=redis \
///     cargo run --bin settings_demo -- --settings=settings/release.toml
use cadence::domain_model::SessionToken;
use cadence::settings::*;

const OVERRIDES: [&str; 6] = [
    "CADENCE_SESSION__EXPIRE_SECS",
    "CADENCE_SESSION__REFRESH_GRACE_SECS",
    "CADENCE_SESSION__REFRESH_LOCK_SECS",
    "CADENCE_SESSION__TOKEN_HEAD",
    "CADENCE_STORE__BACKEND",
    "CADENCE_STORE__REDIS_URL",
];

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;

    for name in OVERRIDES {
        if let Ok(value) = std::env::var(name) {
            println!("override {} = {:?}", name, value);
        }
    }

    let config = project_settings.session.to_config()?;
    println!("store backend: {}", project_settings.store.backend);
    println!(
        "ttl {}s, grace window {}s, refresh lock {:?}",
        config.expire_secs, config.refresh_grace_secs, config.refresh_lock_secs
    );

    let sample = SessionToken::generate();
    println!("wire credential: {}", config.token_head.apply(&sample));
    println!("session key:     {}", config.keyspace.token_key(sample.as_str()));
    println!(
        "lock key:        {}",
        config.keyspace.refresh_lock_key(sample.as_str())
    );

    Ok(())
}
