//! 主应用程序入口
//!
//! 读取配置，装配三个存储适配器与全部服务，
//! 启动定时任务、限流清扫与 Axum Web API 服务。

use std::net::SocketAddr;
use std::sync::Arc;

use application::scheduler::{Scheduler, SchedulerDependencies};
use application::services::{
    AuthService, AuthServiceDependencies, ReadmeService, ReadmeServiceDependencies,
    TemplateService, TemplateServiceDependencies, UserService, UserServiceDependencies,
    VerificationService, VerificationServiceDependencies, WidgetService,
    WidgetServiceDependencies,
};
use application::{BcryptPasswordHasher, SystemClock, Transactor};
use config::AppConfig;
use infrastructure::{
    create_pool, CloudinaryImageStore, MeiliIndex, PgReadmeRepository, PgTemplateRepository,
    PgUserRepository, PgVerificationRepository, PgWidgetRepository, RedisCache, SmtpMailer,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtService, RateLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config_path =
        std::env::var("READMEOW_CONFIG").unwrap_or_else(|_| "config.yml".to_string());
    let config = AppConfig::load(&config_path)?;
    tracing::info!(app = %config.app.name, environment = %config.app.environment, "configuration loaded");

    // PostgreSQL 连接池 + 迁移
    let pool = create_pool(&config.storage.url, config.storage.max_connections).await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // Redis / Meilisearch / SMTP / 图床
    let cache = Arc::new(RedisCache::connect(&config.cache.url).await?);
    let search: Arc<MeiliIndex> = Arc::new(MeiliIndex::new(
        &config.search.url,
        &config.search.api_key,
    )?);
    let mailer = Arc::new(SmtpMailer::new(&config.email)?);
    let image_store = Arc::new(CloudinaryImageStore::new(config.cloudstorage.clone()));

    // 仓储；模板与挂件是缓存型聚合
    let default_ttl = config.cache.default_ttl();
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let template_repository = Arc::new(PgTemplateRepository::new(
        pool.clone(),
        cache.clone(),
        default_ttl,
    ));
    let widget_repository = Arc::new(PgWidgetRepository::new(
        pool.clone(),
        cache.clone(),
        default_ttl,
    ));
    let readme_repository = Arc::new(PgReadmeRepository::new(pool.clone()));
    let verification_repository = Arc::new(PgVerificationRepository::new(pool.clone()));

    let transactor = Arc::new(Transactor::new(pool));
    let password_hasher = Arc::new(BcryptPasswordHasher::new(config.auth.bcrypt_cost));
    let clock = Arc::new(SystemClock);

    // 应用层服务
    let verification_service = Arc::new(VerificationService::new(
        VerificationServiceDependencies {
            verification_repository: verification_repository.clone(),
            user_repository: user_repository.clone(),
            password_hasher: password_hasher.clone(),
            mailer,
            clock: clock.clone(),
            transactor: transactor.clone(),
            code_ttl: config.auth.verification_ttl(),
            attempts: config.auth.verification_attempts,
        },
    ));
    let auth_service = Arc::new(AuthService::new(AuthServiceDependencies {
        user_repository: user_repository.clone(),
        password_hasher: password_hasher.clone(),
    }));
    let template_service = Arc::new(TemplateService::new(TemplateServiceDependencies {
        template_repository: template_repository.clone(),
        user_repository: user_repository.clone(),
        search_index: search.clone(),
        clock: clock.clone(),
        transactor: transactor.clone(),
    }));
    let widget_service = Arc::new(WidgetService::new(WidgetServiceDependencies {
        widget_repository: widget_repository.clone(),
        user_repository: user_repository.clone(),
        search_index: search.clone(),
        transactor: transactor.clone(),
    }));
    let readme_service = Arc::new(ReadmeService::new(ReadmeServiceDependencies {
        readme_repository,
        template_repository: template_repository.clone(),
        widget_repository: widget_repository.clone(),
        user_repository: user_repository.clone(),
        clock: clock.clone(),
        transactor,
    }));
    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository,
        password_hasher,
        image_store,
    }));

    // 定时任务：清理过期验证记录 + 重建搜索索引
    let scheduler = Scheduler::new(SchedulerDependencies {
        verification_repository,
        template_repository,
        widget_repository,
        search_index: search,
        clock,
        config: config.scheduler.clone(),
    });
    let _jobs = scheduler.start();

    // 限流器与清扫任务
    let rate_limiter = Arc::new(RateLimiter::new(
        config.ratelimit.rate_per_sec,
        config.ratelimit.burst,
    ));
    let _sweeper = rate_limiter.start_sweeper();

    let jwt_service = Arc::new(JwtService::new(&config.auth));

    let state = AppState {
        verification_service,
        auth_service,
        template_service,
        widget_service,
        readme_service,
        user_service,
        jwt_service,
        rate_limiter,
    };

    let app = router(state, config.server.request_timeout());
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("readmeow server listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
