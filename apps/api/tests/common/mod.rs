#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use niaga_api::{ApiConfig, AppState};
use niaga_core::invoice::FixedClock;
use niaga_core::{Product, RequestContext, Role, User};
use niaga_db::{Database, DbConfig};

/// 2025-01-15 10:00 UTC, 18:00 in the default +08:00 business offset.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
}

pub struct Fixture {
    pub state: AppState,
    pub admin: User,
    pub alice: User,
    pub bob: User,
    /// 50 000
    pub beras: Product,
    /// 18 000
    pub gula: Product,
}

impl Fixture {
    pub async fn new() -> Fixture {
        Self::with_config(ApiConfig::default()).await
    }

    pub async fn with_config(config: ApiConfig) -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Self::with_database(db, config).await
    }

    /// File-backed database under `dir` with a real connection pool.
    pub async fn on_disk(dir: &Path, max_connections: u32) -> Fixture {
        let db = Database::new(DbConfig::new(dir.join("niaga.db")).max_connections(max_connections))
            .await
            .unwrap();
        Self::with_database(db, ApiConfig::default()).await
    }

    async fn with_database(db: Database, config: ApiConfig) -> Fixture {

        let users = db.users();
        let admin = users
            .insert("Super Admin", "admin@example.com", Role::Admin, Some("Kantor Pusat"), None)
            .await
            .unwrap();
        let alice = users
            .insert("Alice", "alice@example.com", Role::Customer, Some("Jl. Mawar 1"), Some("0811"))
            .await
            .unwrap();
        let bob = users
            .insert("Bob", "bob@example.com", Role::Customer, None, None)
            .await
            .unwrap();

        let products = db.products();
        let beras = products.insert("Beras", Some("5kg"), 50_000).await.unwrap();
        let gula = products.insert("Gula", Some("1kg"), 18_000).await.unwrap();

        let state = AppState::with_clock(db, config, Arc::new(FixedClock(fixed_now())));

        Fixture {
            state,
            admin,
            alice,
            bob,
            beras,
            gula,
        }
    }

    pub fn admin_ctx(&self) -> RequestContext {
        RequestContext::admin(self.admin.id)
    }

    pub fn alice_ctx(&self) -> RequestContext {
        RequestContext::customer(self.alice.id)
    }

    pub fn bob_ctx(&self) -> RequestContext {
        RequestContext::customer(self.bob.id)
    }

    pub async fn sale_count(&self) -> i64 {
        self.state.db.sales().count().await.unwrap()
    }

    pub async fn item_count(&self) -> i64 {
        self.state.db.sales().count_items().await.unwrap()
    }
}
