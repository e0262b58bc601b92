use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{message, user};
use crate::error::{AppError, AppResult};
use crate::repositories::{self, message as mailbox};
use crate::services::required;
use crate::utils::jwt::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: u64,
}

/// Which side of the conversation a user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Sender,
    Receiver,
}

fn side_of(message: &message::Model, user_id: Uuid) -> Option<Side> {
    if message.sender_id == user_id {
        Some(Side::Sender)
    } else if message.receiver_id == user_id {
        Some(Side::Receiver)
    } else {
        None
    }
}

async fn load_own(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<(message::Model, Side)> {
    let message = repositories::require::<message::Entity, _>(db, id, "Message").await?;
    let side = side_of(&message, claims.sub)
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    let hidden = match side {
        Side::Sender => message.deleted_by_sender,
        Side::Receiver => message.deleted_by_receiver,
    };
    if hidden {
        return Err(AppError::NotFound("Message not found".to_string()));
    }
    Ok((message, side))
}

pub async fn send_message(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: SendMessageRequest,
) -> AppResult<message::Model> {
    if payload.receiver_id == claims.sub {
        return Err(AppError::BadRequest("Cannot send a message to yourself".to_string()));
    }
    repositories::require::<user::Entity, _>(db, payload.receiver_id, "Receiver").await?;

    let message = message::ActiveModel {
        id: Set(Uuid::new_v4()),
        sender_id: Set(claims.sub),
        receiver_id: Set(payload.receiver_id),
        subject: Set(required(&payload.subject, "Subject")?),
        body: Set(required(&payload.body, "Body")?),
        is_read: Set(false),
        deleted_by_sender: Set(false),
        deleted_by_receiver: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::debug!(message_id = %message.id, sender_id = %claims.sub, "Message sent");
    Ok(message)
}

pub async fn inbox(db: &DatabaseConnection, claims: &Claims) -> AppResult<Vec<message::Model>> {
    mailbox::inbox(db, claims.sub).await
}

pub async fn outbox(db: &DatabaseConnection, claims: &Claims) -> AppResult<Vec<message::Model>> {
    mailbox::outbox(db, claims.sub).await
}

pub async fn get_message(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<message::Model> {
    Ok(load_own(db, claims, id).await?.0)
}

pub async fn mark_read(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<message::Model> {
    let (message, side) = load_own(db, claims, id).await?;
    if side != Side::Receiver {
        return Err(AppError::Forbidden("Only the receiver can mark a message read".to_string()));
    }
    if message.is_read {
        return Ok(message);
    }

    let mut active: message::ActiveModel = message.into();
    active.is_read = Set(true);
    Ok(active.update(db).await?)
}

/// Hide the message from the caller's side. The row is purged by a delete
/// filtered on both flags, so it goes once both sides have deleted it.
pub async fn delete_message(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<()> {
    let (_, side) = load_own(db, claims, id).await?;
    let column = match side {
        Side::Sender => message::Column::DeletedBySender,
        Side::Receiver => message::Column::DeletedByReceiver,
    };

    let txn = db.begin().await?;
    mailbox::mark_deleted(&txn, id, column).await?;
    let purged = mailbox::purge_if_deleted_by_both(&txn, id).await?;
    txn.commit().await?;

    if purged > 0 {
        tracing::debug!(message_id = %id, "Message removed by both sides");
    }
    Ok(())
}

pub async fn unread_count(db: &DatabaseConnection, claims: &Claims) -> AppResult<UnreadCount> {
    Ok(UnreadCount {
        unread: mailbox::unread_count(db, claims.sub).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn claims(sub: Uuid) -> Claims {
        Claims {
            sub,
            email: "user@example.com".into(),
            role: UserRole::Owner,
            tenant_id: None,
            exp: 0,
            iat: 0,
        }
    }

    fn message(sender_id: Uuid, receiver_id: Uuid) -> message::Model {
        message::Model {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            subject: "Route change".into(),
            body: "Route 12 starts from bay 4 tomorrow".into(),
            is_read: false,
            deleted_by_sender: false,
            deleted_by_receiver: false,
            sent_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_side_of() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = message(a, b);
        assert_eq!(side_of(&msg, a), Some(Side::Sender));
        assert_eq!(side_of(&msg, b), Some(Side::Receiver));
        assert_eq!(side_of(&msg, Uuid::new_v4()), None);
    }

    #[tokio::test]
    async fn test_cannot_message_self() {
        let me = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = send_message(
            &db,
            &claims(me),
            SendMessageRequest {
                receiver_id: me,
                subject: "hi".into(),
                body: "hi".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_sender_cannot_mark_read() {
        let (sender, receiver) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = message(sender, receiver);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .into_connection();

        let result = mark_read(&db, &claims(sender), msg.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_second_delete_removes_row() {
        let (sender, receiver) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = message::Model {
            deleted_by_sender: true,
            ..message(sender, receiver)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
            ])
            .into_connection();

        delete_message(&db, &claims(receiver), msg.id).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("UPDATE"));
        assert!(log.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn test_first_delete_purges_conditionally() {
        let (sender, receiver) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = message(sender, receiver);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
                MockExecResult { last_insert_id: 0, rows_affected: 0 },
            ])
            .into_connection();

        delete_message(&db, &claims(sender), msg.id).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("deleted_by_sender"));
        assert!(log.contains("deleted_by_receiver"));
        assert!(log.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn test_deleted_side_cannot_see_message() {
        let (sender, receiver) = (Uuid::new_v4(), Uuid::new_v4());
        let msg = message::Model {
            deleted_by_receiver: true,
            ..message(sender, receiver)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .into_connection();

        let result = get_message(&db, &claims(receiver), msg.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
