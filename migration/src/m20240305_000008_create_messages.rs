use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000002_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(uuid(Message::Id).primary_key())
                    .col(uuid(Message::SenderId).not_null())
                    .col(uuid(Message::ReceiverId).not_null())
                    .col(string_len(Message::Subject, 200).not_null())
                    .col(text(Message::Body).not_null())
                    .col(boolean(Message::IsRead).not_null().default(false))
                    .col(boolean(Message::DeletedBySender).not_null().default(false))
                    .col(boolean(Message::DeletedByReceiver).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Message::SentAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_sender")
                            .from(Message::Table, Message::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_receiver")
                            .from(Message::Table, Message::ReceiverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_message_receiver")
                    .table(Message::Table)
                    .col(Message::ReceiverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Message::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Message {
    Table,
    Id,
    SenderId,
    ReceiverId,
    Subject,
    Body,
    IsRead,
    DeletedBySender,
    DeletedByReceiver,
    SentAt,
}
