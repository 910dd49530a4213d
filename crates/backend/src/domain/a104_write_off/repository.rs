use contracts::domain::a104_write_off::aggregate::{WriteOff, WriteOffFields};
use contracts::domain::common::{AggregateId, EntityMetadata, RecordId, SheetId};
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

use super::u601_sheet_migration::field_values;
use crate::shared::data::db::get_connection;
use crate::usecases::u601_sheet_migration::{SheetLinkedEntity, StoreRecord};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a104_write_off")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sheet_id: Option<String>,
    pub sheet_id_pending: bool,
    pub synced: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub loan_id: Option<String>,
    pub borrower_id: Option<String>,
    pub write_off_date: Option<String>,
    pub amount_written_off: Option<f64>,
    pub recovered_amount: Option<f64>,
    pub reason: Option<String>,
    pub approved_by: Option<String>,
    pub board_approved: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for WriteOff {
    fn from(m: Model) -> Self {
        WriteOff {
            id: RecordId::from_string(&m.id).unwrap_or(RecordId(Uuid::nil())),
            sheet_id: SheetId::from_columns(m.sheet_id, m.sheet_id_pending),
            synced: m.synced,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
            fields: WriteOffFields {
                loan_id: m.loan_id,
                borrower_id: m.borrower_id,
                write_off_date: m.write_off_date,
                amount_written_off: m.amount_written_off,
                recovered_amount: m.recovered_amount,
                reason: m.reason,
                approved_by: m.approved_by,
                board_approved: m.board_approved,
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
    const CORRELATION: Column = Column::LoanId;

    fn into_record(model: Model) -> StoreRecord {
        let id = model.id.clone();
        let write_off = WriteOff::from(model);
        StoreRecord {
            id,
            sheet_id: write_off.sheet_id,
            synced: write_off.synced,
            values: field_values(&write_off.fields),
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list_all() -> anyhow::Result<Vec<WriteOff>> {
    let items = Entity::find()
        .order_by_desc(Column::WriteOffDate)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<WriteOff>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn delete(id: &str) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
