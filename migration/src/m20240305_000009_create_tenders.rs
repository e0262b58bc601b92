use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000001_create_tenants::Tenant;
use super::m20240305_000002_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tender::Table)
                    .if_not_exists()
                    .col(uuid(Tender::Id).primary_key())
                    .col(uuid(Tender::TenantId).not_null())
                    .col(uuid(Tender::CreatedBy).not_null())
                    .col(string_len(Tender::Title, 200).not_null())
                    .col(text(Tender::Description).not_null())
                    .col(decimal_len_null(Tender::Budget, 12, 2))
                    .col(date(Tender::ClosingDate).not_null())
                    .col(string_len(Tender::Status, 20).not_null().default("open"))
                    .col(
                        timestamp_with_time_zone(Tender::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tender_tenant")
                            .from(Tender::Table, Tender::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tender_created_by")
                            .from(Tender::Table, Tender::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TenderApplication::Table)
                    .if_not_exists()
                    .col(uuid(TenderApplication::Id).primary_key())
                    .col(uuid(TenderApplication::TenderId).not_null())
                    .col(uuid(TenderApplication::ApplicantId).not_null())
                    .col(text(TenderApplication::Proposal).not_null())
                    .col(decimal_len(TenderApplication::QuotedPrice, 12, 2).not_null())
                    .col(string_len(TenderApplication::Status, 20).not_null().default("pending"))
                    .col(
                        timestamp_with_time_zone(TenderApplication::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tender_application_tender")
                            .from(TenderApplication::Table, TenderApplication::TenderId)
                            .to(Tender::Table, Tender::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tender_application_applicant")
                            .from(TenderApplication::Table, TenderApplication::ApplicantId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tender_application_applicant")
                    .table(TenderApplication::Table)
                    .col(TenderApplication::TenderId)
                    .col(TenderApplication::ApplicantId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenderApplication::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tender::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tender {
    Table,
    Id,
    TenantId,
    CreatedBy,
    Title,
    Description,
    Budget,
    ClosingDate,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TenderApplication {
    Table,
    Id,
    TenderId,
    ApplicantId,
    Proposal,
    QuotedPrice,
    Status,
    CreatedAt,
}
