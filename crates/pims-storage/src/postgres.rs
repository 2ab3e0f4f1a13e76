use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use pims_core::{EntryCandidate, EntryKey, LocationKey, StoredEntry};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::info;

use crate::{ImportStore, StoreError};

/// Connection pool for one import run. Holds a single connection: the import
/// is sequential and runs inside one transaction.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        info!("connected to database");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn begin(&self) -> Result<PgImportTx, StoreError> {
        Ok(PgImportTx {
            tx: self.pool.begin().await?,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("database connection closed");
    }
}

pub struct PgImportTx {
    tx: Transaction<'static, Postgres>,
}

fn stored_entry_from_row(row: &PgRow) -> Result<StoredEntry, sqlx::Error> {
    Ok(StoredEntry {
        id: row.try_get("id")?,
        key: EntryKey {
            title: row.try_get("title")?,
            organization_id: row.try_get::<Option<i32>, _>("organization_id")?,
            location_id: row.try_get::<Option<i32>, _>("location_id")?,
            date: row.try_get::<Option<NaiveDate>, _>("date")?,
        },
    })
}

#[async_trait]
impl ImportStore for PgImportTx {
    async fn insert_organizations(&mut self, names: &[String]) -> Result<u64, StoreError> {
        if names.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO organizations (organization_name) ");
        qb.push_values(names, |mut b, name| {
            b.push_bind(name.as_str());
        });
        qb.push(" ON CONFLICT (organization_name) DO NOTHING");
        let result = qb.build().execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn insert_locations(&mut self, locations: &[LocationKey]) -> Result<u64, StoreError> {
        if locations.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO locations (city, province) ");
        qb.push_values(locations, |mut b, loc| {
            b.push_bind(loc.city.as_str()).push_bind(loc.province.as_str());
        });
        qb.push(" ON CONFLICT (city, province) DO NOTHING");
        let result = qb.build().execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn insert_topics(&mut self, names: &[String]) -> Result<u64, StoreError> {
        if names.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("INSERT INTO topic (topic_name) ");
        qb.push_values(names, |mut b, name| {
            b.push_bind(name.as_str());
        });
        qb.push(" ON CONFLICT (topic_name) DO NOTHING");
        let result = qb.build().execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn organization_id(&mut self, name: &str) -> Result<Option<i32>, StoreError> {
        let id = sqlx::query_scalar::<_, i32>(
            "SELECT organization_id FROM organizations WHERE organization_name = $1",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn location_id(&mut self, location: &LocationKey) -> Result<Option<i32>, StoreError> {
        let id = sqlx::query_scalar::<_, i32>(
            "SELECT location_id FROM locations WHERE city = $1 AND province = $2",
        )
        .bind(location.city.as_str())
        .bind(location.province.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn upsert_entries(
        &mut self,
        batch: &[EntryCandidate],
    ) -> Result<Vec<StoredEntry>, StoreError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO pims_main (title, organization_id, location_id, date, summary, source_link, has_photos, type) ",
        );
        qb.push_values(batch, |mut b, c| {
            b.push_bind(c.key.title.as_str())
                .push_bind(c.key.organization_id)
                .push_bind(c.key.location_id)
                .push_bind(c.key.date)
                .push_bind(c.content.summary.as_str())
                .push_bind(c.content.source_link.as_str())
                .push_bind(c.content.has_photos)
                .push_bind(c.content.event_type.as_deref());
        });
        qb.push(
            " ON CONFLICT (title, organization_id, location_id, date) DO UPDATE SET
                  summary = EXCLUDED.summary,
                  source_link = EXCLUDED.source_link,
                  has_photos = EXCLUDED.has_photos,
                  type = EXCLUDED.type
              RETURNING id, title, organization_id, location_id, date",
        );
        let rows = qb.build().fetch_all(&mut *self.tx).await?;
        let stored = rows
            .iter()
            .map(stored_entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stored)
    }

    async fn topic_ids(&mut self) -> Result<HashMap<String, i32>, StoreError> {
        let rows = sqlx::query("SELECT topic_id, topic_name FROM topic")
            .fetch_all(&mut *self.tx)
            .await?;
        let mut out = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: i32 = row.try_get("topic_id")?;
            let name: String = row.try_get("topic_name")?;
            out.insert(name, id);
        }
        Ok(out)
    }

    async fn insert_entry_topics(&mut self, pairs: &[(i32, i32)]) -> Result<u64, StoreError> {
        if pairs.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO pims_entry_topic (pims_id, topic_id) ");
        qb.push_values(pairs, |mut b, (entry_id, topic_id)| {
            b.push_bind(*entry_id).push_bind(*topic_id);
        });
        qb.push(" ON CONFLICT (pims_id, topic_id) DO NOTHING");
        let result = qb.build().execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn insert_languages(&mut self, names: &[String]) -> Result<u64, StoreError> {
        if names.is_empty() {
            return Ok(0);
        }
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO languages (language_name) ");
        qb.push_values(names, |mut b, name| {
            b.push_bind(name.as_str());
        });
        qb.push(" ON CONFLICT (language_name) DO NOTHING");
        let result = qb.build().execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
