use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use std::sync::Arc;

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub issue_endpoint: bool,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let session_config = settings.session.to_config()?;

        let session_store: Arc<dyn SessionStore> = match settings.store.backend.as_str() {
            "memory" => {
                warn!("using in-process session store, sessions are lost on restart");
                Arc::new(MemorySessionStore::with_system_clock())
            }
            "redis" => {
                let url = settings
                    .store
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.redis_url is required for the redis backend"))?;
                Arc::new(RedisSessionStore::connect(url).await?)
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        let session_service: Arc<dyn SessionService> =
            Arc::new(RealSessionService::new(session_store, session_config)?);

        info!(
            backend = settings.store.backend.as_str(),
            "server started"
        );

        Ok(Self::with_service(
            session_service,
            settings.http.issue_endpoint,
        ))
    }

    pub fn with_service(session_service: Arc<dyn SessionService>, issue_endpoint: bool) -> Self {
        Self {
            session_service,
            issue_endpoint,
        }
    }
}
