use contracts::domain::a101_financial_survey::aggregate::{FinancialSurvey, FinancialSurveyFields};
use contracts::domain::common::{AggregateId, EntityMetadata, RecordId, SheetId};
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

use super::u601_sheet_migration::field_values;
use crate::shared::data::db::get_connection;
use crate::usecases::u601_sheet_migration::{SheetLinkedEntity, StoreRecord};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a101_financial_survey")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sheet_id: Option<String>,
    pub sheet_id_pending: bool,
    pub synced: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub credit_application_id: Option<String>,
    pub borrower_id: Option<String>,
    pub business_name: Option<String>,
    pub survey_date: Option<String>,
    pub monthly_revenue: Option<f64>,
    pub cost_of_goods_sold: Option<f64>,
    pub operating_expenses: Option<f64>,
    pub household_expenses: Option<f64>,
    pub existing_loan_repayments: Option<f64>,
    pub number_of_employees: Option<i64>,
    pub owns_premises: Option<i64>,
    pub has_bank_account: Option<i64>,
    pub surveyor_notes: Option<String>,
    pub gross_profit: Option<f64>,
    pub net_disposable_income: Option<f64>,
    pub debt_service_ratio: Option<f64>,
    pub max_affordable_installment: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FinancialSurvey {
    fn from(m: Model) -> Self {
        FinancialSurvey {
            id: RecordId::from_string(&m.id).unwrap_or(RecordId(Uuid::nil())),
            sheet_id: SheetId::from_columns(m.sheet_id, m.sheet_id_pending),
            synced: m.synced,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
            },
            fields: FinancialSurveyFields {
                credit_application_id: m.credit_application_id,
                borrower_id: m.borrower_id,
                business_name: m.business_name,
                survey_date: m.survey_date,
                monthly_revenue: m.monthly_revenue,
                cost_of_goods_sold: m.cost_of_goods_sold,
                operating_expenses: m.operating_expenses,
                household_expenses: m.household_expenses,
                existing_loan_repayments: m.existing_loan_repayments,
                number_of_employees: m.number_of_employees,
                owns_premises: m.owns_premises,
                has_bank_account: m.has_bank_account,
                surveyor_notes: m.surveyor_notes,
                gross_profit: m.gross_profit,
                net_disposable_income: m.net_disposable_income,
                debt_service_ratio: m.debt_service_ratio,
                max_affordable_installment: m.max_affordable_installment,
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
    const CORRELATION: Column = Column::CreditApplicationId;

    fn into_record(model: Model) -> StoreRecord {
        let id = model.id.clone();
        let survey = FinancialSurvey::from(model);
        StoreRecord {
            id,
            sheet_id: survey.sheet_id,
            synced: survey.synced,
            values: field_values(&survey.fields),
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list_all() -> anyhow::Result<Vec<FinancialSurvey>> {
    let items = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<FinancialSurvey>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

/// Hard delete. The sheet row is left alone.
pub async fn delete(id: &str) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()).await?;
    Ok(result.rows_affected > 0)
}
