use contracts::domain::a102_payroll::aggregate::{Payroll, PayrollFields};
use contracts::domain::common::{AggregateId, EntityMetadata, RecordId, SheetId};
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

use super::u601_sheet_migration::field_values;
use crate::shared::data::db::get_connection;
use crate::usecases::u601_sheet_migration::{SheetLinkedEntity, StoreRecord};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a102_payroll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sheet_id: Option<String>,
    pub sheet_id_pending: bool,
    pub synced: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub staff_id: Option<String>,
    pub staff_name: Option<String>,
    pub role: Option<String>,
    pub pay_period: Option<String>,
    pub basic_salary: Option<f64>,
    pub allowances: Option<f64>,
    pub deductions: Option<f64>,
    pub net_pay: Option<f64>,
    pub days_worked: Option<i64>,
    pub paid: Option<i64>,
    pub payment_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Payroll {
    fn from(m: Model) -> Self {
        Payroll {
            id: RecordId::from_string(&m.id).unwrap_or(RecordId(Uuid::nil())),
            sheet_id: SheetId::from_columns(m.sheet_id, m.sheet_id_pending),
            synced: m.synced,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
            fields: PayrollFields {
                staff_id: m.staff_id,
                staff_name: m.staff_name,
                role: m.role,
                pay_period: m.pay_period,
                basic_salary: m.basic_salary,
                allowances: m.allowances,
                deductions: m.deductions,
                net_pay: m.net_pay,
                days_worked: m.days_worked,
                paid: m.paid,
                payment_date: m.payment_date,
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
    const CORRELATION: Column = Column::StaffId;

    fn into_record(model: Model) -> StoreRecord {
        let id = model.id.clone();
        let payroll = Payroll::from(model);
        StoreRecord {
            id,
            sheet_id: payroll.sheet_id,
            synced: payroll.synced,
            values: field_values(&payroll.fields),
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Newest pay period first
pub async fn list_all() -> anyhow::Result<Vec<Payroll>> {
    let items = Entity::find()
        .order_by_desc(Column::PayPeriod)
        .order_by_asc(Column::StaffName)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<Payroll>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn delete(id: &str) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
