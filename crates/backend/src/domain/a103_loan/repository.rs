use contracts::domain::a103_loan::aggregate::{Loan, LoanFields};
use contracts::domain::common::{AggregateId, EntityMetadata, RecordId, SheetId};
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

use super::u601_sheet_migration::field_values;
use crate::shared::data::db::get_connection;
use crate::usecases::u601_sheet_migration::{SheetLinkedEntity, StoreRecord};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a103_loan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sheet_id: Option<String>,
    pub sheet_id_pending: bool,
    pub synced: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub borrower_id: Option<String>,
    pub borrower_name: Option<String>,
    pub credit_application_id: Option<String>,
    pub principal_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub term_months: Option<i64>,
    pub disbursement_date: Option<String>,
    pub maturity_date: Option<String>,
    pub outstanding_balance: Option<f64>,
    pub status: Option<String>,
    pub is_restructured: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Loan {
    fn from(m: Model) -> Self {
        Loan {
            id: RecordId::from_string(&m.id).unwrap_or(RecordId(Uuid::nil())),
            sheet_id: SheetId::from_columns(m.sheet_id, m.sheet_id_pending),
            synced: m.synced,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
            fields: LoanFields {
                borrower_id: m.borrower_id,
                borrower_name: m.borrower_name,
                credit_application_id: m.credit_application_id,
                principal_amount: m.principal_amount,
                interest_rate: m.interest_rate,
                term_months: m.term_months,
                disbursement_date: m.disbursement_date,
                maturity_date: m.maturity_date,
                outstanding_balance: m.outstanding_balance,
                status: m.status,
                is_restructured: m.is_restructured,
            },
        }
    }
}

impl SheetLinkedEntity for Entity {
    const ID: Column = Column::Id;
    const SHEET_ID: Column = Column::SheetId;
    const SHEET_ID_PENDING: Column = Column::SheetIdPending;
    const SYNCED: Column = Column::Synced;
    const CREATED_AT: Column = Column::CreatedAt;
    const UPDATED_AT: Column = Column::UpdatedAt;
    const CORRELATION: Column = Column::BorrowerId;

    fn into_record(model: Model) -> StoreRecord {
        let id = model.id.clone();
        let loan = Loan::from(model);
        StoreRecord {
            id,
            sheet_id: loan.sheet_id,
            synced: loan.synced,
            values: field_values(&loan.fields),
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list_all() -> anyhow::Result<Vec<Loan>> {
    let items = Entity::find()
        .order_by_asc(Column::BorrowerId)
        .order_by_desc(Column::DisbursementDate)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Loans of one borrower
pub async fn list_by_borrower(borrower_id: &str) -> anyhow::Result<Vec<Loan>> {
    let items = Entity::find()
        .filter(Column::BorrowerId.eq(borrower_id))
        .order_by_desc(Column::DisbursementDate)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<Loan>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn delete(id: &str) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
