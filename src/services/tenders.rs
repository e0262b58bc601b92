//! Tenders published by a tenant and the applications suppliers send in.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{
    rental_offer::OfferStatus,
    tender::{self, TenderStatus},
    tender_application,
};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::{ensure_manager, non_negative, required};
use crate::utils::jwt::Claims;
use crate::utils::transitions::ensure_transition;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenderRequest {
    pub title: String,
    pub description: String,
    pub budget: Option<Decimal>,
    pub closing_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderFilter {
    pub tenant_id: Option<Uuid>,
    pub status: Option<TenderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTenderStatusRequest {
    pub status: TenderStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub proposal: String,
    pub quoted_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct DecideApplicationRequest {
    pub status: OfferStatus,
}

pub async fn create_tender(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateTenderRequest,
) -> AppResult<tender::Model> {
    let tenant_id = claims.require_tenant()?;
    ensure_manager(claims, tenant_id)?;

    if payload.closing_date < Utc::now().date_naive() {
        return Err(AppError::BadRequest("Closing date is in the past".to_string()));
    }

    let tender = tender::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        created_by: Set(claims.sub),
        title: Set(required(&payload.title, "Title")?),
        description: Set(required(&payload.description, "Description")?),
        budget: Set(payload.budget.map(|b| non_negative(b, "Budget")).transpose()?),
        closing_date: Set(payload.closing_date),
        status: Set(TenderStatus::Open),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(tender_id = %tender.id, tenant_id = %tenant_id, "Tender published");
    Ok(tender)
}

pub async fn list_tenders(db: &DatabaseConnection, filter: TenderFilter) -> AppResult<Vec<tender::Model>> {
    let mut query = tender::Entity::find().order_by_asc(tender::Column::ClosingDate);
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(tender::Column::TenantId.eq(tenant_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(tender::Column::Status.eq(status));
    }
    Ok(query.all(db).await?)
}

pub async fn get_tender(db: &DatabaseConnection, id: Uuid) -> AppResult<tender::Model> {
    repositories::require::<tender::Entity, _>(db, id, "Tender").await
}

pub async fn update_status(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateTenderStatusRequest,
) -> AppResult<tender::Model> {
    let tender = get_tender(db, id).await?;
    ensure_manager(claims, tender.tenant_id)?;
    ensure_transition("Tender", tender.status, payload.status)?;

    let mut active: tender::ActiveModel = tender.into();
    active.status = Set(payload.status);
    Ok(active.update(db).await?)
}

pub async fn apply(
    db: &DatabaseConnection,
    claims: &Claims,
    tender_id: Uuid,
    payload: ApplyRequest,
) -> AppResult<tender_application::Model> {
    let tender = get_tender(db, tender_id).await?;
    if tender.status != TenderStatus::Open || tender.closing_date < Utc::now().date_naive() {
        return Err(AppError::Conflict("Tender is no longer accepting applications".to_string()));
    }
    if claims.tenant_id == Some(tender.tenant_id) {
        return Err(AppError::BadRequest("Cannot apply to your own tenant's tender".to_string()));
    }

    let existing = tender_application::Entity::find()
        .filter(tender_application::Column::TenderId.eq(tender.id))
        .filter(tender_application::Column::ApplicantId.eq(claims.sub))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("You already applied to this tender".to_string()));
    }

    let application = tender_application::ActiveModel {
        id: Set(Uuid::new_v4()),
        tender_id: Set(tender.id),
        applicant_id: Set(claims.sub),
        proposal: Set(required(&payload.proposal, "Proposal")?),
        quoted_price: Set(non_negative(payload.quoted_price, "Quoted price")?),
        status: Set(OfferStatus::Pending),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(application)
}

/// Managers of the tender's tenant see every application, applicants their own
pub async fn list_applications(
    db: &DatabaseConnection,
    claims: &Claims,
    tender_id: Uuid,
) -> AppResult<Vec<tender_application::Model>> {
    let tender = get_tender(db, tender_id).await?;

    let mut query = tender_application::Entity::find()
        .filter(tender_application::Column::TenderId.eq(tender.id))
        .order_by_asc(tender_application::Column::QuotedPrice);
    if ensure_manager(claims, tender.tenant_id).is_err() {
        query = query.filter(tender_application::Column::ApplicantId.eq(claims.sub));
    }

    Ok(query.all(db).await?)
}

/// Accepting an application awards the tender and turns down the rest
pub async fn decide_application(
    db: &DatabaseConnection,
    claims: &Claims,
    application_id: Uuid,
    payload: DecideApplicationRequest,
) -> AppResult<tender_application::Model> {
    let txn = db.begin().await?;

    let tender_id =
        repositories::require::<tender_application::Entity, _>(&txn, application_id, "Application")
            .await?
            .tender_id;
    // Decisions on one tender queue up behind this lock
    let tender = tender::Entity::find_by_id(tender_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Tender not found".to_string()))?;
    ensure_manager(claims, tender.tenant_id)?;
    let application =
        repositories::require::<tender_application::Entity, _>(&txn, application_id, "Application").await?;
    ensure_transition("Application", application.status, payload.status)?;

    if payload.status == OfferStatus::Accepted {
        ensure_transition("Tender", tender.status, TenderStatus::Awarded)?;

        tender_application::Entity::update_many()
            .col_expr(tender_application::Column::Status, Expr::value(OfferStatus::Rejected))
            .filter(tender_application::Column::TenderId.eq(tender.id))
            .filter(tender_application::Column::Id.ne(application.id))
            .filter(tender_application::Column::Status.eq(OfferStatus::Pending))
            .exec(&txn)
            .await?;

        let mut awarded: tender::ActiveModel = tender.into();
        awarded.status = Set(TenderStatus::Awarded);
        awarded.update(&txn).await?;
    }

    let mut active: tender_application::ActiveModel = application.into();
    active.status = Set(payload.status);
    let application = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        application_id = %application.id,
        status = ?application.status,
        "Tender application decided"
    );
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn manager_of(tenant_id: Uuid) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "manager@example.com".into(),
            role: UserRole::Staff,
            tenant_id: Some(tenant_id),
            exp: 0,
            iat: 0,
        }
    }

    fn tender(tenant_id: Uuid, status: TenderStatus) -> tender::Model {
        tender::Model {
            id: Uuid::new_v4(),
            tenant_id,
            created_by: Uuid::new_v4(),
            title: "Rank cleaning".into(),
            description: "Daily cleaning of bays 1 to 12".into(),
            budget: Some(Decimal::new(25000, 0)),
            closing_date: Utc::now().date_naive() + Duration::days(14),
            status,
            created_at: Utc::now().into(),
        }
    }

    fn application(tender_id: Uuid, status: OfferStatus) -> tender_application::Model {
        tender_application::Model {
            id: Uuid::new_v4(),
            tender_id,
            applicant_id: Uuid::new_v4(),
            proposal: "Two crews, mornings and evenings".into(),
            quoted_price: Decimal::new(21000, 0),
            status,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_closing_date_in_past_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = create_tender(
            &db,
            &manager_of(Uuid::new_v4()),
            CreateTenderRequest {
                title: "Security".into(),
                description: "Night guards".into(),
                budget: None,
                closing_date: Utc::now().date_naive() - Duration::days(1),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_driver_cannot_publish_tender() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let claims = Claims {
            role: UserRole::Driver,
            ..manager_of(Uuid::new_v4())
        };
        let result = create_tender(
            &db,
            &claims,
            CreateTenderRequest {
                title: "Security".into(),
                description: "Night guards".into(),
                budget: None,
                closing_date: Utc::now().date_naive() + Duration::days(3),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cannot_apply_to_own_tender() {
        let tenant_id = Uuid::new_v4();
        let open = tender(tenant_id, TenderStatus::Open);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![open.clone()]])
            .into_connection();

        let result = apply(
            &db,
            &manager_of(tenant_id),
            open.id,
            ApplyRequest {
                proposal: "We can do it".into(),
                quoted_price: Decimal::new(100, 0),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_closed_tender_takes_no_applications() {
        let closed = tender(Uuid::new_v4(), TenderStatus::Closed);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![closed.clone()]])
            .into_connection();

        let result = apply(
            &db,
            &manager_of(Uuid::new_v4()),
            closed.id,
            ApplyRequest {
                proposal: "Late bid".into(),
                quoted_price: Decimal::new(100, 0),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_accepting_application_awards_tender_under_lock() {
        let tenant_id = Uuid::new_v4();
        let open = tender(tenant_id, TenderStatus::Open);
        let pending = application(open.id, OfferStatus::Pending);
        let awarded = tender::Model {
            status: TenderStatus::Awarded,
            ..open.clone()
        };
        let accepted = tender_application::Model {
            status: OfferStatus::Accepted,
            ..pending.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![open.clone()]])
            .append_query_results([vec![pending.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 2 }])
            .append_query_results([vec![awarded]])
            .append_query_results([vec![accepted]])
            .into_connection();

        let result = decide_application(
            &db,
            &manager_of(tenant_id),
            pending.id,
            DecideApplicationRequest {
                status: OfferStatus::Accepted,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.status, OfferStatus::Accepted);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
    }

    #[tokio::test]
    async fn test_second_winner_is_rejected() {
        let tenant_id = Uuid::new_v4();
        let awarded = tender(tenant_id, TenderStatus::Awarded);
        let pending = application(awarded.id, OfferStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![awarded]])
            .append_query_results([vec![pending.clone()]])
            .into_connection();

        let result = decide_application(
            &db,
            &manager_of(tenant_id),
            pending.id,
            DecideApplicationRequest {
                status: OfferStatus::Accepted,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
