use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::query::{ApartmentPredicate, ListingQuery, SortDirective},
    application::repos::{
        ApartmentPage, ApartmentsRepo, ApartmentsWriteRepo, CreateApartmentParams, RepoError,
        UpdateApartmentParams,
    },
    domain::entities::{ApartmentRecord, LocationCount},
};

use super::{PostgresRepositories, map_sqlx_error, util::like_pattern};

const APARTMENT_COLUMNS: &str = "id, unit_name, unit_number, project, price, bedrooms, \
     bathrooms, area_sqft, location, description, images, amenities, is_available, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ApartmentRow {
    id: Uuid,
    unit_name: String,
    unit_number: String,
    project: String,
    price: f64,
    bedrooms: i32,
    bathrooms: i32,
    area_sqft: i32,
    location: String,
    description: Option<String>,
    images: Vec<String>,
    amenities: Vec<String>,
    is_available: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ApartmentRow> for ApartmentRecord {
    fn from(row: ApartmentRow) -> Self {
        Self {
            id: row.id,
            unit_name: row.unit_name,
            unit_number: row.unit_number,
            project: row.project,
            price: row.price,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            area_sqft: row.area_sqft,
            location: row.location,
            description: row.description,
            images: row.images,
            amenities: row.amenities,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One row of the listing statement. Page columns are NULL when the
/// requested window is past the last match.
#[derive(sqlx::FromRow)]
struct ListingRow {
    total: i64,
    id: Option<Uuid>,
    unit_name: Option<String>,
    unit_number: Option<String>,
    project: Option<String>,
    price: Option<f64>,
    bedrooms: Option<i32>,
    bathrooms: Option<i32>,
    area_sqft: Option<i32>,
    location: Option<String>,
    description: Option<String>,
    images: Option<Vec<String>>,
    amenities: Option<Vec<String>>,
    is_available: Option<bool>,
    created_at: Option<OffsetDateTime>,
    updated_at: Option<OffsetDateTime>,
}

impl ListingRow {
    fn into_record(self) -> Option<ApartmentRecord> {
        Some(ApartmentRecord {
            id: self.id?,
            unit_name: self.unit_name?,
            unit_number: self.unit_number?,
            project: self.project?,
            price: self.price?,
            bedrooms: self.bedrooms?,
            bathrooms: self.bathrooms?,
            area_sqft: self.area_sqft?,
            location: self.location?,
            description: self.description,
            images: self.images?,
            amenities: self.amenities?,
            is_available: self.is_available?,
            created_at: self.created_at?,
            updated_at: self.updated_at?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LocationCountRow {
    location: String,
    count: i64,
}

impl PostgresRepositories {
    fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &ApartmentPredicate) {
        qb.push(" WHERE is_available = ");
        qb.push_bind(predicate.is_available);

        if let Some(search) = predicate.search.as_deref() {
            Self::push_text_match(qb, search);
        }

        if let Some(min) = predicate.price.min {
            qb.push(" AND price >= ");
            qb.push_bind(min);
        }
        if let Some(max) = predicate.price.max {
            qb.push(" AND price <= ");
            qb.push_bind(max);
        }
        if let Some(min) = predicate.area.min {
            qb.push(" AND area_sqft >= ");
            qb.push_bind(min);
        }
        if let Some(max) = predicate.area.max {
            qb.push(" AND area_sqft <= ");
            qb.push_bind(max);
        }

        if !predicate.bedrooms.is_empty() {
            qb.push(" AND bedrooms = ANY(");
            qb.push_bind(predicate.bedrooms.clone());
            qb.push(")");
        }
        if !predicate.bathrooms.is_empty() {
            qb.push(" AND bathrooms = ANY(");
            qb.push_bind(predicate.bathrooms.clone());
            qb.push(")");
        }
        if !predicate.locations.is_empty() {
            qb.push(" AND location = ANY(");
            qb.push_bind(predicate.locations.clone());
            qb.push(")");
        }
        if !predicate.amenities.is_empty() {
            qb.push(" AND amenities @> ");
            qb.push_bind(predicate.amenities.clone());
        }
    }

    /// Case-insensitive containment on the four text columns.
    fn push_text_match(qb: &mut QueryBuilder<'_, Postgres>, term: &str) {
        let pattern = like_pattern(term);
        qb.push(" AND (");
        for (index, column) in ["unit_name", "unit_number", "project", "location"]
            .into_iter()
            .enumerate()
        {
            if index > 0 {
                qb.push(" OR ");
            }
            qb.push(column);
            qb.push(" ILIKE ");
            qb.push_bind(pattern.clone());
        }
        qb.push(")");
    }

    fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: SortDirective, qualifier: &str) {
        let direction = sort.order.sql();
        qb.push(" ORDER BY ");
        qb.push(qualifier);
        qb.push(sort.field.column());
        qb.push(" ");
        qb.push(direction);
        qb.push(", ");
        qb.push(qualifier);
        qb.push("id ");
        qb.push(direction);
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        u64::try_from(value).map_err(|_| RepoError::Integrity {
            message: format!("negative row count `{value}`"),
        })
    }
}

#[async_trait]
impl ApartmentsRepo for PostgresRepositories {
    async fn list_apartments(&self, query: &ListingQuery) -> Result<ApartmentPage, RepoError> {
        let limit = i64::from(query.limit);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let mut qb = QueryBuilder::new("WITH filtered AS (SELECT ");
        qb.push(APARTMENT_COLUMNS);
        qb.push(" FROM apartments");
        Self::push_predicate(&mut qb, &query.predicate);
        qb.push(
            "), counted AS (SELECT COUNT(*) AS total FROM filtered) \
             SELECT counted.total, page.* FROM counted \
             LEFT JOIN LATERAL (SELECT * FROM filtered",
        );
        Self::push_order(&mut qb, query.sort, "");
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        qb.push(") page ON TRUE");
        Self::push_order(&mut qb, query.sort, "page.");

        let rows = qb
            .build_query_as::<ListingRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let total = match rows.first() {
            Some(row) => Self::convert_count(row.total)?,
            None => 0,
        };
        let items = rows.into_iter().filter_map(ListingRow::into_record).collect();

        Ok(ApartmentPage { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApartmentRecord>, RepoError> {
        let sql = format!("SELECT {APARTMENT_COLUMNS} FROM apartments WHERE id = $1");
        let row = sqlx::query_as::<_, ApartmentRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ApartmentRecord::from))
    }

    async fn location_counts(&self) -> Result<Vec<LocationCount>, RepoError> {
        let rows = sqlx::query_as::<_, LocationCountRow>(
            "SELECT location, COUNT(*) AS count FROM apartments GROUP BY location ORDER BY location",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| LocationCount {
                location: row.location,
                count: row.count,
            })
            .collect())
    }

    async fn search_apartments(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<ApartmentRecord>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(APARTMENT_COLUMNS);
        qb.push(" FROM apartments WHERE TRUE");
        Self::push_text_match(&mut qb, term);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(i64::from(limit));

        let rows = qb
            .build_query_as::<ApartmentRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ApartmentRecord::from).collect())
    }
}

#[async_trait]
impl ApartmentsWriteRepo for PostgresRepositories {
    async fn create_apartment(
        &self,
        params: CreateApartmentParams,
    ) -> Result<ApartmentRecord, RepoError> {
        let sql = format!(
            "INSERT INTO apartments (id, unit_name, unit_number, project, price, bedrooms, \
             bathrooms, area_sqft, location, description, images, amenities, is_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {APARTMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ApartmentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.unit_name)
            .bind(params.unit_number)
            .bind(params.project)
            .bind(params.price)
            .bind(params.bedrooms)
            .bind(params.bathrooms)
            .bind(params.area_sqft)
            .bind(params.location)
            .bind(params.description)
            .bind(params.images)
            .bind(params.amenities)
            .bind(params.is_available)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_apartment(
        &self,
        params: UpdateApartmentParams,
    ) -> Result<Option<ApartmentRecord>, RepoError> {
        let sql = format!(
            "UPDATE apartments SET \
                 unit_name = COALESCE($2, unit_name), \
                 unit_number = COALESCE($3, unit_number), \
                 project = COALESCE($4, project), \
                 price = COALESCE($5, price), \
                 bedrooms = COALESCE($6, bedrooms), \
                 bathrooms = COALESCE($7, bathrooms), \
                 area_sqft = COALESCE($8, area_sqft), \
                 location = COALESCE($9, location), \
                 description = COALESCE($10, description), \
                 images = COALESCE($11, images), \
                 amenities = COALESCE($12, amenities), \
                 is_available = COALESCE($13, is_available), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {APARTMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ApartmentRow>(&sql)
            .bind(params.id)
            .bind(params.unit_name)
            .bind(params.unit_number)
            .bind(params.project)
            .bind(params.price)
            .bind(params.bedrooms)
            .bind(params.bathrooms)
            .bind(params.area_sqft)
            .bind(params.location)
            .bind(params.description)
            .bind(params.images)
            .bind(params.amenities)
            .bind(params.is_available)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ApartmentRecord::from))
    }

    async fn delete_apartment(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM apartments WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
