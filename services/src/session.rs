use crate::activity::ActivityService;
use crate::context::ActingUser;
use crate::error::{ServiceError, ServiceResult};
use crate::session_generator::{self, Expansion, RecurrencePattern, SessionDefaults};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use db::models::{activity, session};
use db::models::session::NewSession;
use rand::RngCore;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, TransactionTrait};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct SessionInput {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QrCode {
    pub session_id: i64,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurringOutcome {
    pub sessions: Vec<session::Model>,
    pub truncated: bool,
}

/// 32 random bytes, hex encoded.
fn random_qr_payload() -> String {
    let mut buf = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

fn conflict_or(err: DbErr, date: NaiveDate, start_time: NaiveTime) -> ServiceError {
    if db::is_unique_violation(&err) {
        ServiceError::SessionConflict { date, start_time }
    } else {
        ServiceError::Database(err)
    }
}

async fn insert_unique<C>(conn: &C, new: NewSession) -> ServiceResult<session::Model>
where
    C: ConnectionTrait,
{
    let (date, start_time) = (new.date, new.start_time);
    if session::Model::slot_taken(conn, new.activity_id, date, start_time).await? {
        return Err(ServiceError::SessionConflict { date, start_time });
    }
    session::Model::create(conn, new)
        .await
        .map_err(|e| conflict_or(e, date, start_time))
}

pub struct SessionService<'a> {
    db: &'a DatabaseConnection,
    qr_ttl: Duration,
}

impl<'a> SessionService<'a> {
    pub fn new(db: &'a DatabaseConnection, qr_ttl: Duration) -> Self {
        Self { db, qr_ttl }
    }

    /// Uses the configured QR lifetime.
    pub fn from_config(db: &'a DatabaseConnection) -> Self {
        let minutes = i64::try_from(util::config::qr_code_ttl_minutes()).unwrap_or(i64::MAX);
        Self::new(db, Duration::minutes(minutes.min(24 * 60)))
    }

    fn activities(&self) -> ActivityService<'a> {
        ActivityService::new(self.db)
    }

    pub async fn list(&self, activity_id: i64) -> ServiceResult<Vec<session::Model>> {
        self.activities().get(activity_id).await?;
        Ok(session::Model::find_for_activity(self.db, activity_id).await?)
    }

    /// Loads a session and checks it belongs to `activity_id`.
    pub async fn get(&self, activity_id: i64, session_id: i64) -> ServiceResult<session::Model> {
        session::Entity::find_by_id(session_id)
            .one(self.db)
            .await?
            .filter(|s| s.activity_id == activity_id)
            .ok_or_else(|| ServiceError::not_found(format!("Session {session_id}")))
    }

    pub async fn create_single(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        input: SessionInput,
    ) -> ServiceResult<session::Model> {
        let activity = self.activities().get_for_review(actor, activity_id).await?;

        if input.end_time <= input.start_time {
            return Err(ServiceError::InvalidRange(format!(
                "end time {} must be after start time {}",
                input.end_time.format("%H:%M"),
                input.start_time.format("%H:%M")
            )));
        }
        if input.max_participants.is_some_and(|m| m < 1) {
            return Err(ServiceError::validation(
                "max_participants must be at least 1",
            ));
        }

        let created = insert_unique(
            self.db,
            NewSession {
                activity_id,
                date: input.date,
                start_time: input.start_time,
                end_time: input.end_time,
                location: input
                    .location
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or(activity.location),
                max_participants: input.max_participants,
            },
        )
        .await?;

        tracing::info!(activity_id, session_id = created.id, date = %created.date, "Session created");
        Ok(created)
    }

    /// Expands without persisting.
    pub async fn preview(
        &self,
        activity_id: i64,
        pattern: &RecurrencePattern,
    ) -> ServiceResult<Expansion> {
        let activity = self.activities().get(activity_id).await?;
        session_generator::expand(pattern, &defaults_for(&activity))
    }

    /// Expands and persists all sessions in one transaction. A collision with
    /// any existing session rejects the whole batch.
    pub async fn create_recurring(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        pattern: &RecurrencePattern,
    ) -> ServiceResult<RecurringOutcome> {
        let activity = self.activities().get_for_review(actor, activity_id).await?;
        let expansion = session_generator::expand(pattern, &defaults_for(&activity))?;

        let txn = self.db.begin().await?;
        let mut sessions = Vec::with_capacity(expansion.sessions.len());
        for generated in expansion.sessions {
            let inserted = insert_unique(
                &txn,
                NewSession {
                    activity_id,
                    date: generated.date,
                    start_time: generated.start_time,
                    end_time: generated.end_time,
                    location: generated.location,
                    max_participants: Some(generated.max_participants),
                },
            )
            .await;

            match inserted {
                Ok(model) => sessions.push(model),
                Err(err) => {
                    txn.rollback().await?;
                    return Err(err);
                }
            }
        }
        txn.commit().await?;

        tracing::info!(
            activity_id,
            count = sessions.len(),
            truncated = expansion.truncated,
            "Recurring sessions created"
        );
        Ok(RecurringOutcome {
            sessions,
            truncated: expansion.truncated,
        })
    }

    pub async fn cancel(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        session_id: i64,
    ) -> ServiceResult<()> {
        self.activities().get_for_review(actor, activity_id).await?;
        let current = self.get(activity_id, session_id).await?;

        if !session::Model::cancel(self.db, session_id).await? {
            return Err(ServiceError::transition(
                current.status,
                session::SessionStatus::Cancelled,
            ));
        }
        tracing::info!(activity_id, session_id, "Session cancelled");
        Ok(())
    }

    /// Issues a fresh QR payload, replacing any previous one.
    pub async fn issue_qr(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        session_id: i64,
    ) -> ServiceResult<QrCode> {
        self.activities().get_for_review(actor, activity_id).await?;
        let current = self.get(activity_id, session_id).await?;
        if current.is_cancelled() {
            return Err(ServiceError::validation(
                "Cannot issue a QR code for a cancelled session",
            ));
        }

        let code = random_qr_payload();
        let expires_at = Utc::now() + self.qr_ttl;
        session::Model::set_qr(self.db, session_id, Some(code.clone()), Some(expires_at)).await?;

        tracing::info!(activity_id, session_id, %expires_at, "QR code issued");
        Ok(QrCode {
            session_id,
            code,
            expires_at,
        })
    }

    /// Drops the QR payload; the session falls back to manual check-in.
    pub async fn clear_qr(
        &self,
        actor: &ActingUser,
        activity_id: i64,
        session_id: i64,
    ) -> ServiceResult<session::Model> {
        self.activities().get_for_review(actor, activity_id).await?;
        self.get(activity_id, session_id).await?;
        Ok(session::Model::set_qr(self.db, session_id, None, None).await?)
    }
}

fn defaults_for(activity: &activity::Model) -> SessionDefaults {
    SessionDefaults {
        location: activity.location.clone(),
        max_participants: activity.max_participants,
    }
}
