use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::common::SheetId;
use sea_orm::sea_query::{Alias, Expr, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::marker::PhantomData;

use super::record_store::{RecordStore, StoreRecord};
use crate::shared::field_mapper::{FieldKind, FieldSpec, FieldValues};

/// A sea-orm entity whose table carries the sheet link columns
/// (`id`, `sheet_id`, `sheet_id_pending`, `synced`, `created_at`, `updated_at`)
pub trait SheetLinkedEntity: EntityTrait {
    const ID: Self::Column;
    const SHEET_ID: Self::Column;
    const SHEET_ID_PENDING: Self::Column;
    const SYNCED: Self::Column;
    const CREATED_AT: Self::Column;
    const UPDATED_AT: Self::Column;
    /// Column filtered by the correlation key of a migration run
    const CORRELATION: Self::Column;

    fn into_record(model: Self::Model) -> StoreRecord;
}

/// [`RecordStore`] over any [`SheetLinkedEntity`]. Business columns are
/// written by store field name, typed by the entity's field map.
pub struct SeaOrmStore<E> {
    db: DatabaseConnection,
    fields: &'static [FieldSpec],
    _entity: PhantomData<fn() -> E>,
}

impl<E: SheetLinkedEntity> SeaOrmStore<E> {
    pub fn new(db: DatabaseConnection, fields: &'static [FieldSpec]) -> Self {
        Self {
            db,
            fields,
            _entity: PhantomData,
        }
    }

    fn column(column: E::Column) -> Alias {
        Alias::new(column.as_str())
    }

    /// Business columns present in `values`, with values fitted to the
    /// column type
    fn business_columns(&self, values: &FieldValues) -> Vec<(Alias, SimpleExpr)> {
        for (field, _) in values.iter() {
            if !self.fields.iter().any(|s| s.store_field == field.as_str()) {
                tracing::debug!(
                    "Ignoring unknown field {} for table {}",
                    field,
                    E::default().table_name()
                );
            }
        }
        self.fields
            .iter()
            .filter(|spec| values.contains(spec.store_field))
            .map(|spec| (Alias::new(spec.store_field), typed_value(spec, values)))
            .collect()
    }
}

/// SQL value for one field. A value of the wrong type becomes NULL.
fn typed_value(spec: &FieldSpec, values: &FieldValues) -> SimpleExpr {
    let field = spec.store_field;
    match spec.kind {
        FieldKind::Currency => Expr::value(values.number(field).flatten()),
        FieldKind::Integer | FieldKind::BooleanToInt => {
            Expr::value(values.integer(field).flatten())
        }
        FieldKind::Date => Expr::value(values.date(field).flatten()),
        FieldKind::Text => Expr::value(values.text(field).flatten()),
    }
}

fn split_sheet_id(sheet_id: Option<&SheetId>) -> (Option<String>, bool) {
    match sheet_id {
        Some(id) => (Some(id.as_str().to_string()), !id.is_durable()),
        None => (None, false),
    }
}

#[async_trait]
impl<E> RecordStore for SeaOrmStore<E>
where
    E: SheetLinkedEntity + 'static,
    E::Model: Sync,
{
    async fn count(&self) -> anyhow::Result<u64> {
        Ok(E::find().count(&self.db).await?)
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<StoreRecord>> {
        let model = E::find().filter(E::ID.eq(id)).one(&self.db).await?;
        Ok(model.map(E::into_record))
    }

    async fn find_by_sheet_id(&self, sheet_id: &str) -> anyhow::Result<Option<StoreRecord>> {
        let model = E::find()
            .filter(E::SHEET_ID.eq(sheet_id.trim()))
            .one(&self.db)
            .await?;
        Ok(model.map(E::into_record))
    }

    async fn find_unsynced(&self, correlation: Option<&str>) -> anyhow::Result<Vec<StoreRecord>> {
        let mut query = E::find().filter(E::SYNCED.eq(false));
        if let Some(value) = correlation {
            query = query.filter(E::CORRELATION.eq(value));
        }
        let models = query.order_by_asc(E::CREATED_AT).all(&self.db).await?;
        Ok(models.into_iter().map(E::into_record).collect())
    }

    async fn create(
        &self,
        values: &FieldValues,
        sheet_id: Option<SheetId>,
        synced: bool,
    ) -> anyhow::Result<StoreRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let (sheet_value, pending) = split_sheet_id(sheet_id.as_ref());

        let mut columns = vec![
            Self::column(E::ID),
            Self::column(E::SHEET_ID),
            Self::column(E::SHEET_ID_PENDING),
            Self::column(E::SYNCED),
            Self::column(E::CREATED_AT),
            Self::column(E::UPDATED_AT),
        ];
        let mut row: Vec<SimpleExpr> = vec![
            Expr::value(id.clone()),
            Expr::value(sheet_value),
            Expr::value(pending),
            Expr::value(synced),
            Expr::value(now),
            Expr::value(now),
        ];
        for (column, value) in self.business_columns(values) {
            columns.push(column);
            row.push(value);
        }

        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(E::default().table_name()))
            .columns(columns)
            .values(row)?;
        let statement = self.db.get_database_backend().build(&insert);
        self.db.execute(statement).await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Record {} vanished after insert", id))
    }

    async fn update_fields(&self, id: &str, values: &FieldValues) -> anyhow::Result<()> {
        let mut update = E::update_many().col_expr(E::UPDATED_AT, Expr::value(Utc::now()));
        for (column, value) in self.business_columns(values) {
            update = update.col_expr(column, value);
        }
        let result = update.filter(E::ID.eq(id)).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(anyhow::anyhow!("Record {} not found", id));
        }
        Ok(())
    }

    async fn update_sync_status(&self, id: &str, synced: bool) -> anyhow::Result<()> {
        let result = E::update_many()
            .col_expr(E::SYNCED, Expr::value(synced))
            .col_expr(E::UPDATED_AT, Expr::value(Utc::now()))
            .filter(E::ID.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(anyhow::anyhow!("Record {} not found", id));
        }
        Ok(())
    }

    async fn set_sheet_id(&self, id: &str, sheet_id: SheetId) -> anyhow::Result<()> {
        let (value, pending) = split_sheet_id(Some(&sheet_id));
        let result = E::update_many()
            .col_expr(E::SHEET_ID, Expr::value(value))
            .col_expr(E::SHEET_ID_PENDING, Expr::value(pending))
            .col_expr(E::UPDATED_AT, Expr::value(Utc::now()))
            .filter(E::ID.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(anyhow::anyhow!("Record {} not found", id));
        }
        Ok(())
    }
}
