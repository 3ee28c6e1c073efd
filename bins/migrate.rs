//! Operator tool: apply schema migrations and seed reference service types.

use std::process::ExitCode;

use configs::{AppConfig, LogFormat};
use migration::{Migrator, MigratorTrait};
use tracing::{error, info, warn};

fn init_logging(cfg: Option<&AppConfig>) {
    dotenvy::dotenv().ok();
    match cfg {
        Some(cfg) => common::utils::logging::init_logging(
            cfg.logging.format == LogFormat::Json,
            cfg.logging.filter.as_deref(),
        ),
        None => common::utils::logging::init_logging_default(),
    }
    info!(service = "migrate", event = "logger_init", "tracing subscriber initialized");
}

async fn run(cfg: &AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::test_connection(&db).await?;

    let pending = Migrator::get_pending_migrations(&db).await?.len();
    info!(service = "migrate", event = "migrate_up", pending, "applying migrations");
    Migrator::up(&db, None).await?;

    for name in &cfg.catalog.seed_service_types {
        let st = models::service_type::find_or_create(&db, name).await?;
        info!(service = "migrate", event = "service_type_seeded", id = %st.id, name = %st.name, "service type ready");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_logging(None);
            error!(service = "migrate", event = "config_invalid", error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    init_logging(Some(&cfg));
    if cfg.catalog.srid != 4326 {
        warn!(service = "migrate", srid = cfg.catalog.srid, "schema geometry column is fixed at SRID 4326");
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "migrate", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(&cfg)) {
        Ok(()) => {
            info!(service = "migrate", event = "done", "migrations applied");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "migrate", event = "failed", error = %e, "migration failed");
            ExitCode::FAILURE
        }
    }
}
