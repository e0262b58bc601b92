pub use sea_orm_migration::prelude::*;

mod m20240305_000001_create_tenants;
mod m20240305_000002_create_users;
mod m20240305_000003_create_profiles;
mod m20240305_000004_create_vehicles;
mod m20240305_000005_create_taxi_ranks;
mod m20240305_000006_create_trips;
mod m20240305_000007_create_rentals;
mod m20240305_000008_create_messages;
mod m20240305_000009_create_tenders;
mod m20240305_000010_create_service_requests;
mod m20240611_000001_add_taxi_rank_associations;
mod m20240618_000001_fix_taxi_rank_associations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240305_000001_create_tenants::Migration),
            Box::new(m20240305_000002_create_users::Migration),
            Box::new(m20240305_000003_create_profiles::Migration),
            Box::new(m20240305_000004_create_vehicles::Migration),
            Box::new(m20240305_000005_create_taxi_ranks::Migration),
            Box::new(m20240305_000006_create_trips::Migration),
            Box::new(m20240305_000007_create_rentals::Migration),
            Box::new(m20240305_000008_create_messages::Migration),
            Box::new(m20240305_000009_create_tenders::Migration),
            Box::new(m20240305_000010_create_service_requests::Migration),
            Box::new(m20240611_000001_add_taxi_rank_associations::Migration),
            Box::new(m20240618_000001_fix_taxi_rank_associations::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    /// SQL of every migration's `up`, in order, rendered for PostgreSQL
    async fn applied_sql() -> Vec<String> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results((0..100).map(|_| MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }))
            .into_connection();

        {
            let manager = SchemaManager::new(&db);
            for migration in Migrator::migrations() {
                migration.up(&manager).await.unwrap();
            }
        }

        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    fn create_table<'a>(sql: &'a [String], table: &str) -> &'a str {
        let plain = format!("CREATE TABLE \"{}\" (", table);
        let guarded = format!("CREATE TABLE IF NOT EXISTS \"{}\" (", table);
        sql.iter()
            .find(|s| s.starts_with(&plain) || s.starts_with(&guarded))
            .unwrap_or_else(|| panic!("no CREATE TABLE for {}", table))
    }

    #[async_std::test]
    async fn test_tenant_owned_tables_cascade() {
        let sql = applied_sql().await;

        for table in ["user", "vehicle", "taxi_rank", "route", "tender", "taxi_rank_association"] {
            let stmt = create_table(&sql, table);
            assert!(
                stmt.contains(r#"REFERENCES "tenant" ("id") ON DELETE CASCADE"#),
                "{} does not cascade from tenant: {}",
                table,
                stmt
            );
        }
    }

    #[async_std::test]
    async fn test_association_pair_is_unique() {
        let sql = applied_sql().await;

        let index = sql
            .iter()
            .position(|s| s.starts_with("CREATE UNIQUE INDEX \"idx_taxi_rank_association_pair\""))
            .expect("unique association index");
        assert!(sql[index].contains(r#""taxi_rank_association" ("taxi_rank_id", "tenant_id")"#));

        // Duplicates must be gone before the index goes on
        let dedupe = sql
            .iter()
            .position(|s| s.contains("DELETE FROM taxi_rank_association"))
            .expect("deduplication step");
        assert!(dedupe < index);

        let backfills = sql
            .iter()
            .filter(|s| s.contains("INSERT INTO taxi_rank_association") && s.contains("ON CONFLICT"))
            .count();
        assert_eq!(backfills, 2);
    }
}
