#![allow(dead_code)]

use std::env;
use std::sync::LazyLock;

use diesel::{Connection, PgConnection, RunQueryDsl, sql_query};
use rsshub::Result;
use rsshub::configuration::{DatabaseSettings, get_configuration};
use rsshub::db::DbPool;
use rsshub::db::articles::ArticleRepo;
use rsshub::db::config::ConfigRepo;
use rsshub::db::connection::create_pool_from_settings;
use rsshub::db::feeds::FeedRepo;
use rsshub::db::migrations::run_pending;
use rsshub::engine::Aggregator;
use rsshub::fetcher::Fetcher;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt, registry};
use uuid::Uuid;

/// Test harness wiring a repository-backed [`Aggregator`] against an
/// isolated, per-test Postgres database.
pub struct TestHarness {
    pub db_pool: DbPool,
    pub feed_repo: FeedRepo,
    pub article_repo: ArticleRepo,
    pub config_repo: ConfigRepo,
    pub aggregator: Aggregator,
}

impl TestHarness {
    pub fn new() -> Self {
        LazyLock::force(&TRACING);

        let settings = get_configuration().expect("failed to read configuration");
        let db_pool = create_isolated_test_database(settings.database);

        let feed_repo = FeedRepo::new(db_pool.clone());
        let article_repo = ArticleRepo::new(db_pool.clone());
        let config_repo = ConfigRepo::new(db_pool.clone());
        let fetcher = Fetcher::new(Default::default());
        let aggregator = Aggregator::new(
            feed_repo.clone(),
            article_repo.clone(),
            config_repo.clone(),
            fetcher,
        );

        Self {
            db_pool,
            feed_repo,
            article_repo,
            config_repo,
            aggregator,
        }
    }
}

/// Creates a uniquely-named database, grants the application user full
/// permissions on it, and runs migrations — isolating each test from every
/// other test's rows without needing to truncate tables between runs.
fn create_isolated_test_database(mut config: DatabaseSettings) -> DbPool {
    config.database_name = format!("rsshub_test_{}", Uuid::new_v4().simple());

    let mut system_settings = config.clone();
    system_settings.database_name = "postgres".to_string();

    let mut system_conn = PgConnection::establish(&system_settings.connection_string())
        .expect("failed to connect to postgres system database");

    sql_query(format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .execute(&mut system_conn)
        .expect("failed to create test database");

    grant_database_permissions(&config);

    let mut app_conn = PgConnection::establish(&config.connection_string())
        .expect("failed to connect to test database with application credentials");
    run_pending(&mut app_conn).expect("failed to run database migrations");

    create_pool_from_settings(&config).expect("failed to build test connection pool")
}

fn grant_database_permissions(config: &DatabaseSettings) {
    let mut conn = PgConnection::establish(&config.connection_string())
        .expect("failed to connect to test database to grant permissions");

    sql_query(format!(
        r#"GRANT ALL ON DATABASE "{}" TO "{}";"#,
        config.database_name, config.username
    ))
    .execute(&mut conn)
    .expect("failed to grant database privileges");

    sql_query(format!(
        r#"GRANT USAGE, CREATE ON SCHEMA public TO "{}";"#,
        config.username
    ))
    .execute(&mut conn)
    .expect("failed to grant schema privileges");
}

static TRACING: LazyLock<Result<()>> = LazyLock::new(configure_test_tracing);

/// Respects `TEST_LOG`: set it to see test output, leave it unset for quiet
/// test runs.
fn configure_test_tracing() -> Result<()> {
    let subscriber =
        registry().with(EnvFilter::from_default_env().add_directive(LevelFilter::TRACE.into()));

    if env::var("TEST_LOG").is_ok() {
        let subscriber = subscriber.with(fmt::Layer::new().with_test_writer());
        tracing::subscriber::set_global_default(subscriber)
            .expect("failed to set global tracing subscriber");
    } else {
        tracing::subscriber::set_global_default(subscriber)
            .expect("failed to set global tracing subscriber");
    }

    Ok(())
}
