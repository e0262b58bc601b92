use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

use super::m20240611_000001_add_taxi_rank_associations::TaxiRankAssociation;

#[derive(DeriveMigrationName)]
pub struct Migration;

const UNIQUE_INDEX: &str = "idx_taxi_rank_association_pair";

/// Keeps the earliest row of every duplicated (rank, tenant) pair.
const DEDUPLICATE_SQL: &str = r#"
DELETE FROM taxi_rank_association a
USING taxi_rank_association b
WHERE a.taxi_rank_id = b.taxi_rank_id
  AND a.tenant_id = b.tenant_id
  AND (a.created_at, a.id) > (b.created_at, b.id)
"#;

/// Ranks created between the two migrations never got their owning tenant.
const BACKFILL_MISSING_SQL: &str = r#"
INSERT INTO taxi_rank_association (id, taxi_rank_id, tenant_id, is_primary, created_at)
SELECT gen_random_uuid(), tr.id, tr.tenant_id, TRUE, CURRENT_TIMESTAMP
FROM taxi_rank tr
WHERE NOT EXISTS (
    SELECT 1 FROM taxi_rank_association a WHERE a.taxi_rank_id = tr.id
)
ON CONFLICT (taxi_rank_id, tenant_id) DO NOTHING
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(DEDUPLICATE_SQL).await?;

        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_INDEX)
                    .table(TaxiRankAssociation::Table)
                    .col(TaxiRankAssociation::TaxiRankId)
                    .col(TaxiRankAssociation::TenantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        db.execute_unprepared(BACKFILL_MISSING_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(UNIQUE_INDEX)
                    .table(TaxiRankAssociation::Table)
                    .to_owned(),
            )
            .await
    }
}
