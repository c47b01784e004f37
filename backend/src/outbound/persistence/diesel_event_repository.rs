//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.
//!
//! Images live in `event_images` keyed by `(event_id, position)` and are
//! written once, together with the event, inside a transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{EventRepository, EventRepositoryError};
use crate::domain::{
    CoverCharge, CreatorSummary, Email, EventDetails, EventId, EventListing, EventRecord,
    EventRecordParts, FullName, ImageBlob, Moderation, ReviewState, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    CreatorRow, EventImageRow, EventRow, EventUpdate, NewEventImageRow, NewEventRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{event_images, events, users};
use uuid::Uuid;

/// Diesel-backed implementation of the `EventRepository` port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> EventRepositoryError {
    map_pool_error(error, |message| EventRepositoryError::connection(message))
}

fn diesel_error(error: diesel::result::Error) -> EventRepositoryError {
    map_diesel_error(
        error,
        |message| EventRepositoryError::query(message),
        |message| EventRepositoryError::connection(message),
    )
}

fn corrupt(column: &str) -> EventRepositoryError {
    EventRepositoryError::query(format!("stored event has invalid {column}"))
}

fn row_to_record(
    row: EventRow,
    images: Vec<EventImageRow>,
) -> Result<EventRecord, EventRepositoryError> {
    let state: ReviewState = row.status.parse().map_err(|_| corrupt("status"))?;
    let cover_charge = CoverCharge::new(row.cover_charge).map_err(|_| corrupt("cover charge"))?;
    let mut images = images;
    images.sort_by_key(|image| image.position);
    Ok(EventRecord::from_parts(EventRecordParts {
        id: EventId::from_uuid(row.id),
        details: EventDetails {
            name: row.name,
            bar: row.bar,
            location: row.location,
            cover_charge,
            description: row.description,
            map_reference: row.map_reference,
        },
        images: images
            .into_iter()
            .map(|image| ImageBlob::from_stored(image.content_type, image.data))
            .collect(),
        moderation: Moderation {
            state,
            comment: row.admin_comment,
            reviewed_at: row.reviewed_at,
        },
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_creator(row: CreatorRow) -> Result<CreatorSummary, EventRepositoryError> {
    Ok(CreatorSummary {
        id: UserId::from_uuid(row.id),
        full_name: FullName::new(&row.full_name).map_err(|_| corrupt("creator name"))?,
        email: Email::new(&row.email).map_err(|_| corrupt("creator email"))?,
        role: row.role.parse().map_err(|_| corrupt("creator role"))?,
    })
}

/// Load images for `rows` and fold both into domain records.
async fn attach_images(
    conn: &mut AsyncPgConnection,
    rows: Vec<EventRow>,
) -> Result<Vec<EventRecord>, EventRepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let images: Vec<EventImageRow> = event_images::table
        .filter(event_images::event_id.eq_any(ids))
        .select(EventImageRow::as_select())
        .load(conn)
        .await
        .map_err(diesel_error)?;
    let mut grouped: HashMap<Uuid, Vec<EventImageRow>> = HashMap::new();
    for image in images {
        grouped.entry(image.event_id).or_default().push(image);
    }
    rows.into_iter()
        .map(|row| {
            let images = grouped.remove(&row.id).unwrap_or_default();
            row_to_record(row, images)
        })
        .collect()
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn insert(&self, event: &EventRecord) -> Result<(), EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let details = event.details();
        let moderation = event.moderation();
        let event_id = *event.id().as_uuid();
        let row = NewEventRow {
            id: event_id,
            name: &details.name,
            bar: &details.bar,
            location: &details.location,
            cover_charge: details.cover_charge.amount(),
            description: &details.description,
            map_reference: &details.map_reference,
            status: moderation.state.as_str(),
            admin_comment: moderation.comment.as_deref(),
            reviewed_at: moderation.reviewed_at,
            created_by: *event.created_by().as_uuid(),
            created_at: event.created_at(),
            updated_at: event.updated_at(),
        };
        let image_rows = event
            .images()
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let position = i16::try_from(index)
                    .map_err(|_| EventRepositoryError::query("too many images"))?;
                Ok(NewEventImageRow {
                    event_id,
                    position,
                    content_type: image.content_type(),
                    data: image.data(),
                })
            })
            .collect::<Result<Vec<_>, EventRepositoryError>>()?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(events::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                if !image_rows.is_empty() {
                    diesel::insert_into(event_images::table)
                        .values(&image_rows)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)
    }

    async fn find(&self, id: &EventId) -> Result<Option<EventRecord>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<EventRow> = events::table
            .find(id.as_uuid())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        match row {
            Some(row) => Ok(attach_images(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, event: &EventRecord) -> Result<(), EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let details = event.details();
        let moderation = event.moderation();
        let update = EventUpdate {
            name: &details.name,
            bar: &details.bar,
            location: &details.location,
            cover_charge: details.cover_charge.amount(),
            description: &details.description,
            map_reference: &details.map_reference,
            status: moderation.state.as_str(),
            admin_comment: moderation.comment.as_deref(),
            reviewed_at: moderation.reviewed_at,
            updated_at: event.updated_at(),
        };
        let updated = diesel::update(events::table.find(event.id().as_uuid()))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(EventRepositoryError::query("record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(events::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_approved(&self) -> Result<Vec<EventRecord>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = events::table
            .filter(events::status.eq(ReviewState::Approved.as_str()))
            .select(EventRow::as_select())
            .order(events::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| row_to_record(row, Vec::new()))
            .collect()
    }

    async fn list_all_with_creators(&self) -> Result<Vec<EventListing>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let joined: Vec<(EventRow, CreatorRow)> = events::table
            .inner_join(users::table)
            .select((EventRow::as_select(), CreatorRow::as_select()))
            .order(events::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let (rows, creators): (Vec<_>, Vec<_>) = joined.into_iter().unzip();
        let records = attach_images(&mut conn, rows).await?;
        records
            .into_iter()
            .zip(creators)
            .map(|(record, creator)| {
                Ok(EventListing {
                    record,
                    creator: Some(row_to_creator(creator)?),
                })
            })
            .collect()
    }

    async fn list_by_creator(
        &self,
        creator: &UserId,
    ) -> Result<Vec<EventRecord>, EventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = events::table
            .filter(events::created_by.eq(creator.as_uuid()))
            .select(EventRow::as_select())
            .order(events::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        attach_images(&mut conn, rows).await
    }
}
