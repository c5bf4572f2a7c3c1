use axum::Router;
use tempfile::TempDir;

use sensormon_server::app::{App, create_app, create_router};
use sensormon_server::configs::{Audit, Database, Listener, Logger, Refresh, Server, Settings, Thresholds};

pub struct MockApp {
    pub dir: TempDir,
    pub settings: Settings,
    pub app: App,
    pub router: Router,
}

impl MockApp {
    pub async fn new() -> Self {
        Self::with_refresh_interval(3_600_000).await
    }

    pub async fn with_refresh_interval(interval_ms: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let settings = Settings {
            logger: Logger {
                level: String::from("debug"),
            },
            listener: Listener {
                host: String::from("127.0.0.1"),
                port: 0,
                max_payload: 1024,
                read_timeout_ms: 500,
            },
            server: Server {
                host: String::from("127.0.0.1"),
                port: 0,
            },
            database: Database {
                url: String::from("sqlite::memory:"),
                clean_start: true,
                max_connections: 1,
            },
            audit: Audit {
                operation_log: dir.path().join("operation_log.txt").to_string_lossy().to_string(),
                anomaly_log: dir.path().join("event_log.txt").to_string_lossy().to_string(),
                mirror_capacity: 100,
            },
            refresh: Refresh {
                interval_ms,
                window_size: 10,
            },
            thresholds: Thresholds::default(),
        };

        let app = create_app(&settings).await.unwrap();
        let router = create_router(&app);

        Self {
            dir,
            settings,
            app,
            router,
        }
    }
}
