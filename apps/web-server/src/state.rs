//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use shutter_core::ports::{
    CommentRepository, ImageStore, PasswordService, PostRepository, SessionStore, UserRepository,
};
use shutter_core::{AccountService, FeedAssembler};
use shutter_infra::{
    DatabaseConnections, InMemorySessionStore, LocalImageStore, PostgresCommentRepository,
    PostgresPostRepository, PostgresUserRepository, Sha512PasswordService,
};

use crate::config::AppConfig;
use crate::middleware::session::{SessionConfig, SessionManager};

/// Port implementations the state is assembled from.
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub images: Arc<dyn ImageStore>,
    pub sessions: Arc<dyn SessionStore>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub images: Arc<dyn ImageStore>,
    pub accounts: AccountService,
    pub feed: FeedAssembler,
    pub sessions: SessionManager,
    db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Wire services over already-built ports.
    pub fn from_ports(ports: Ports, session: SessionConfig) -> Self {
        Self {
            accounts: AccountService::new(ports.users.clone(), ports.passwords),
            feed: FeedAssembler::new(ports.users.clone(), ports.comments.clone()),
            sessions: SessionManager::new(ports.sessions, session),
            users: ports.users,
            posts: ports.posts,
            comments: ports.comments,
            images: ports.images,
            db: None,
        }
    }

    /// Connect the store, open the image directory and build the state.
    ///
    /// Fails when the database is unreachable; there is no degraded mode.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let connections = DatabaseConnections::init(&config.database)
            .await
            .context("Failed to connect to database")?;
        let images = LocalImageStore::init(config.image_dir.clone())
            .await
            .context("Failed to open image directory")?;

        let sessions = Arc::new(InMemorySessionStore::new());
        spawn_session_sweeper(sessions.clone());

        let conn = connections.main.clone();
        let ports = Ports {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
            passwords: Arc::new(Sha512PasswordService::new()),
            images: Arc::new(images),
            sessions,
        };

        let mut state = Self::from_ports(ports, config.session.clone());
        state.db = Some(Arc::new(connections));

        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Release the connection pool.
    ///
    /// The repositories hold the pool too, so they are dropped first. Worker
    /// clones of the state are gone once the server has stopped.
    pub async fn shutdown(self) {
        let Self {
            users,
            posts,
            comments,
            images,
            accounts,
            feed,
            sessions,
            db,
        } = self;
        drop((users, posts, comments, images, accounts, feed, sessions));

        let Some(db) = db else {
            return;
        };
        match Arc::try_unwrap(db) {
            Ok(db) => {
                if let Err(e) = db.close().await {
                    tracing::error!("Failed to close database pool: {}", e);
                }
            }
            Err(_) => tracing::warn!("Application state still shared, skipping pool close"),
        }
    }
}

/// Interval between sweeps of expired sessions.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn spawn_session_sweeper(store: Arc<InMemorySessionStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Expired sessions purged");
            }
        }
    });
}
