use sea_orm_migration::sea_orm::ConnectionTrait;
use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000001_create_tenants::Tenant;
use super::m20240305_000005_create_taxi_ranks::TaxiRank;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Ranks that existed before the association table belonged to exactly one
/// tenant, so that relationship becomes their primary association.
const BACKFILL_SQL: &str = r#"
INSERT INTO taxi_rank_association (id, taxi_rank_id, tenant_id, is_primary, created_at)
SELECT gen_random_uuid(), tr.id, tr.tenant_id, TRUE, CURRENT_TIMESTAMP
FROM taxi_rank tr
ON CONFLICT DO NOTHING
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaxiRankAssociation::Table)
                    .if_not_exists()
                    .col(uuid(TaxiRankAssociation::Id).primary_key())
                    .col(uuid(TaxiRankAssociation::TaxiRankId).not_null())
                    .col(uuid(TaxiRankAssociation::TenantId).not_null())
                    .col(boolean(TaxiRankAssociation::IsPrimary).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(TaxiRankAssociation::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_association_taxi_rank")
                            .from(TaxiRankAssociation::Table, TaxiRankAssociation::TaxiRankId)
                            .to(TaxiRank::Table, TaxiRank::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_association_tenant")
                            .from(TaxiRankAssociation::Table, TaxiRankAssociation::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager.get_connection().execute_unprepared(BACKFILL_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaxiRankAssociation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TaxiRankAssociation {
    Table,
    Id,
    TaxiRankId,
    TenantId,
    IsPrimary,
    CreatedAt,
}
