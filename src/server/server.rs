use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use chrono::Duration;
use sqlx::MySqlPool;
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let key = std::env::var("JWT_SIGNING_KEY")
            .unwrap_or_else(|_| "my-dev-secret-key".to_string())
            .into_bytes();
        let token_codec: Arc<dyn AccessTokenCodec> = Arc::new(JwtHs256Codec::new(TokenConfig {
            issuer: settings.auth.issuer.clone(),
            access_ttl: Duration::seconds(settings.auth.access_ttl_secs),
            signing_key: key,
        }));

        let policy = AuthPolicy {
            refresh_ttl: Duration::days(settings.auth.refresh_ttl_days),
            platform: settings.auth.platform,
        };

        let (user_repo, refresh_store, pool): (
            Arc<dyn UserRepo>,
            Arc<dyn RefreshTokenStore>,
            Option<MySqlPool>,
        ) = match settings.auth.backend.as_str() {
            "memory" => (
                Arc::new(MemoryUserRepo::new()),
                Arc::new(MemoryRefreshTokenStore::new()),
                None,
            ),
            "mysql" => {
                let pool = MySqlPool::connect(&settings.store.mysql_dsn).await?;
                (
                    Arc::new(MySqlUserRepo::new(pool.clone())),
                    Arc::new(MySqlRefreshTokenStore::new(pool.clone())),
                    Some(pool),
                )
            }
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            user_repo,
            credential_hasher,
            token_codec,
            refresh_store,
            policy,
        ));

        info!("server started");

        Ok(Self { auth_service, pool })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
