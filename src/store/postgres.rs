use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    Store, StoreError, StoreResult, ALREADY_REVIEWED, DUPLICATE_APPLICATION, DUPLICATE_IDENTITY,
};
use crate::applications::model::{
    Application, ApplicationFilter, ApplicationStatus, NewApplication,
};
use crate::events::model::{Event, EventStatus, NewEvent, Registration};
use crate::opportunities::model::{NewOpportunity, Opportunity, OpportunityFilter};
use crate::users::model::{NewUser, Profile, User};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }
}

fn unique_violation(e: sqlx::Error, message: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Database(e)
}

fn parse_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> StoreResult<T> {
    raw.parse().map_err(StoreError::Corrupt)
}

// ---- rows ----

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    name: String,
    profile: Json<Profile>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            name: r.name,
            profile: r.profile.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OpportunityRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    required_skills: Vec<String>,
    organization_id: Uuid,
    start_date: OffsetDateTime,
    end_date: Option<OffsetDateTime>,
    status: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<OpportunityRow> for Opportunity {
    type Error = StoreError;

    fn try_from(r: OpportunityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            title: r.title,
            description: r.description,
            location: r.location,
            required_skills: r.required_skills,
            organization_id: r.organization_id,
            start_date: r.start_date,
            end_date: r.end_date,
            status: parse_enum(&r.status)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    user_id: Uuid,
    opportunity_id: Uuid,
    status: String,
    applied_at: OffsetDateTime,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(r: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            opportunity_id: r.opportunity_id,
            status: parse_enum(&r.status)?,
            applied_at: r.applied_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    date: String,
    time: String,
    location: String,
    organizer_id: Uuid,
    status: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(r: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            title: r.title,
            description: r.description,
            date: r.date,
            time: r.time,
            location: r.location,
            organizer_id: r.organizer_id,
            status: parse_enum(&r.status)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, name, profile, created_at, updated_at";
const OPPORTUNITY_COLUMNS: &str = "id, title, description, location, required_skills, \
     organization_id, start_date, end_date, status, created_at, updated_at";
const APPLICATION_COLUMNS: &str = "id, user_id, opportunity_id, status, applied_at";
const EVENT_COLUMNS: &str =
    "id, title, description, date, time, location, organizer_id, status, created_at, updated_at";

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
        let user_type = new.profile.user_type();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, name, user_type, profile)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(user_type.as_str())
        .bind(Json(&new.profile))
        .fetch_one(&self.db)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_IDENTITY))?;
        Ok(row.into())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn identity_taken(&self, username: &str, email: &str) -> StoreResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn update_user(&self, user: &User) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET name = $2, email = $3, profile = $4, updated_at = now()
             WHERE id = $1 AND user_type = $5
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(Json(&user.profile))
        .bind(user.user_type().as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_IDENTITY))?;
        row.map(Into::into)
            .ok_or_else(|| StoreError::Corrupt(format!("user {} not updated", user.id)))
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_opportunity(&self, new: NewOpportunity) -> StoreResult<Opportunity> {
        let row = sqlx::query_as::<_, OpportunityRow>(&format!(
            r#"
            INSERT INTO opportunities
                (id, title, description, location, required_skills, organization_id,
                 start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {OPPORTUNITY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(&new.required_skills)
        .bind(new.organization_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .fetch_one(&self.db)
        .await?;
        row.try_into()
    }

    async fn find_opportunity(&self, id: Uuid) -> StoreResult<Option<Opportunity>> {
        let row = sqlx::query_as::<_, OpportunityRow>(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn update_opportunity(&self, o: &Opportunity) -> StoreResult<Opportunity> {
        let row = sqlx::query_as::<_, OpportunityRow>(&format!(
            r#"
            UPDATE opportunities
               SET title = $2, description = $3, location = $4, required_skills = $5,
                   start_date = $6, end_date = $7, status = $8, updated_at = now()
             WHERE id = $1
            RETURNING {OPPORTUNITY_COLUMNS}
            "#
        ))
        .bind(o.id)
        .bind(&o.title)
        .bind(&o.description)
        .bind(&o.location)
        .bind(&o.required_skills)
        .bind(o.start_date)
        .bind(o.end_date)
        .bind(o.status.as_str())
        .fetch_optional(&self.db)
        .await?;
        row.ok_or_else(|| StoreError::Corrupt(format!("opportunity {} not updated", o.id)))?
            .try_into()
    }

    async fn delete_opportunity(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM opportunities WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_opportunities(&self, filter: OpportunityFilter) -> StoreResult<Vec<Opportunity>> {
        let rows = sqlx::query_as::<_, OpportunityRow>(&format!(
            r#"
            SELECT {OPPORTUNITY_COLUMNS}
              FROM opportunities
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::uuid IS NULL OR organization_id = $2)
             ORDER BY created_at DESC
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.organization_id)
        .fetch_all(&self.db)
        .await?;
        convert_all(rows)
    }

    async fn opportunities_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Opportunity>> {
        let rows = sqlx::query_as::<_, OpportunityRow>(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;
        convert_all(rows)
    }

    async fn insert_application(&self, new: NewApplication) -> StoreResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications (id, user_id, opportunity_id)
            VALUES ($1, $2, $3)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.opportunity_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_APPLICATION))?;
        row.try_into()
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn find_application_for(
        &self,
        user_id: Uuid,
        opportunity_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = $1 AND opportunity_id = $2"
        ))
        .bind(user_id)
        .bind(opportunity_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
               SET status = $2
             WHERE id = $1 AND status = $3
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_optional(&self.db)
        .await?;
        match row {
            Some(row) => Ok(Some(row.try_into()?)),
            None => match self.find_application(id).await? {
                Some(_) => Err(StoreError::Conflict(ALREADY_REVIEWED.into())),
                None => Ok(None),
            },
        }
    }

    async fn list_applications(&self, filter: ApplicationFilter) -> StoreResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
              FROM applications
             WHERE ($1::uuid IS NULL OR user_id = $1)
               AND ($2::uuid IS NULL OR opportunity_id = $2)
             ORDER BY applied_at DESC
            "#
        ))
        .bind(filter.user_id)
        .bind(filter.opportunity_id)
        .fetch_all(&self.db)
        .await?;
        convert_all(rows)
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, title, description, date, time, location, organizer_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.date)
        .bind(&new.time)
        .bind(&new.location)
        .bind(new.organizer_id)
        .bind(EventStatus::Upcoming.as_str())
        .fetch_one(&self.db)
        .await?;
        row.try_into()
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list_events(&self, ids: Option<&[Uuid]>) -> StoreResult<Vec<Event>> {
        let rows = match ids {
            Some(ids) => {
                sqlx::query_as::<_, EventRow>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE id = ANY($1) ORDER BY created_at"
                ))
                .bind(ids)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, EventRow>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };
        convert_all(rows)
    }

    async fn register_for_event(&self, r: Registration) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO event_registrations (event_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(r.event_id)
        .bind(r.user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn registrations_for_events(&self, event_ids: &[Uuid]) -> StoreResult<Vec<Registration>> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT event_id, user_id
              FROM event_registrations
             WHERE event_id = ANY($1)
             ORDER BY registered_at
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(event_id, user_id)| Registration { event_id, user_id })
            .collect())
    }

    async fn event_ids_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT event_id FROM event_registrations WHERE user_id = $1 ORDER BY registered_at",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opportunities::model::OpportunityStatus;
    use crate::users::model::{IndividualProfile, OrganizationProfile};

    fn new_user(username: &str, email: &str, profile: Profile) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
            name: username.into(),
            profile,
        }
    }

    fn volunteer_profile() -> Profile {
        Profile::Individual(IndividualProfile {
            bio: Some("Weekend helper".into()),
            location: None,
            skills: vec!["first aid".into(), "driving".into()],
        })
    }

    fn ngo_profile(name: &str) -> Profile {
        Profile::Organization(OrganizationProfile {
            organization_name: name.into(),
            website: Some("https://acme.example.org".into()),
            service_types: vec!["environment".into()],
            ..Default::default()
        })
    }

    async fn ngo(store: &PgStore, username: &str) -> User {
        store
            .insert_user(new_user(
                username,
                &format!("{username}@x.org"),
                ngo_profile(username),
            ))
            .await
            .unwrap()
    }

    async fn opportunity(store: &PgStore, owner: Uuid, title: &str) -> Opportunity {
        store
            .insert_opportunity(NewOpportunity {
                title: title.into(),
                description: "Pick up litter".into(),
                location: "Shore".into(),
                required_skills: vec!["stamina".into()],
                organization_id: owner,
                start_date: OffsetDateTime::now_utc(),
                end_date: None,
            })
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_username_or_email_conflicts(pool: PgPool) {
        let store = PgStore::from_pool(pool);
        store
            .insert_user(new_user("bob", "bob@x.org", volunteer_profile()))
            .await
            .unwrap();

        let err = store
            .insert_user(new_user("bob", "other@x.org", volunteer_profile()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store
            .insert_user(new_user("robert", "bob@x.org", volunteer_profile()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        assert!(store.identity_taken("bob", "nobody@x.org").await.unwrap());
        assert!(!store.identity_taken("alice", "alice@x.org").await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn profile_round_trips_and_role_is_fixed(pool: PgPool) {
        let store = PgStore::from_pool(pool);
        let acme = ngo(&store, "acme").await;

        let loaded = store.find_user(acme.id).await.unwrap().unwrap();
        assert_eq!(loaded.profile, ngo_profile("acme"));
        let by_name = store.find_user_by_username("acme").await.unwrap().unwrap();
        assert_eq!(by_name.id, acme.id);

        let mut edited = loaded.clone();
        edited.name = "Acme Admin".into();
        edited.profile = ngo_profile("Acme Foundation");
        let saved = store.update_user(&edited).await.unwrap();
        assert_eq!(saved.name, "Acme Admin");
        assert_eq!(saved.profile.organization_name(), Some("Acme Foundation"));

        let mut switched = saved.clone();
        switched.profile = volunteer_profile();
        let err = store.update_user(&switched).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
        let stored = store.find_user(acme.id).await.unwrap().unwrap();
        assert_eq!(stored.profile, ngo_profile("Acme Foundation"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn email_taken_by_another_user_conflicts_on_update(pool: PgPool) {
        let store = PgStore::from_pool(pool);
        ngo(&store, "acme").await;
        let mut bob = store
            .insert_user(new_user("bob", "bob@x.org", volunteer_profile()))
            .await
            .unwrap();

        bob.email = "acme@x.org".into();
        let err = store.update_user(&bob).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_application_conflicts_and_review_settles_once(pool: PgPool) {
        let store = PgStore::from_pool(pool);
        let acme = ngo(&store, "acme").await;
        let bob = store
            .insert_user(new_user("bob", "bob@x.org", volunteer_profile()))
            .await
            .unwrap();
        let opp = opportunity(&store, acme.id, "Beach Cleanup").await;
        let new = NewApplication {
            user_id: bob.id,
            opportunity_id: opp.id,
        };

        let application = store.insert_application(new).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);
        let err = store.insert_application(new).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(m) if m == DUPLICATE_APPLICATION));

        let accepted = store
            .set_application_status(application.id, ApplicationStatus::Accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status, ApplicationStatus::Accepted);
        let err = store
            .set_application_status(application.id, ApplicationStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store
            .set_application_status(Uuid::new_v4(), ApplicationStatus::Accepted)
            .await
            .unwrap()
            .is_none());

        // applications outlive their opportunity
        assert!(store.delete_opportunity(opp.id).await.unwrap());
        let mine = store
            .list_applications(ApplicationFilter::by_user(bob.id))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, ApplicationStatus::Accepted);
        assert!(store.opportunities_by_ids(&[opp.id]).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn filters_by_owner_and_status(pool: PgPool) {
        let store = PgStore::from_pool(pool);
        let acme = ngo(&store, "acme").await;
        let rival = ngo(&store, "rival").await;
        let cleanup = opportunity(&store, acme.id, "Beach Cleanup").await;
        opportunity(&store, acme.id, "Tree Planting").await;
        opportunity(&store, rival.id, "Food Bank").await;

        let mut closed = cleanup.clone();
        closed.status = OpportunityStatus::Closed;
        closed.organization_id = rival.id;
        let saved = store.update_opportunity(&closed).await.unwrap();
        assert_eq!(saved.status, OpportunityStatus::Closed);
        assert_eq!(saved.organization_id, acme.id);

        let open = store
            .list_opportunities(OpportunityFilter::open())
            .await
            .unwrap();
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|o| o.status == OpportunityStatus::Open));

        let owned = store
            .list_opportunities(OpportunityFilter::owned_by(acme.id))
            .await
            .unwrap();
        assert_eq!(owned.len(), 2);

        let owned_open = store
            .list_opportunities(OpportunityFilter {
                status: Some(OpportunityStatus::Open),
                organization_id: Some(acme.id),
            })
            .await
            .unwrap();
        assert_eq!(owned_open.len(), 1);
        assert_eq!(owned_open[0].title, "Tree Planting");

        let everything = store
            .list_opportunities(OpportunityFilter::default())
            .await
            .unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn registering_twice_is_a_no_op(pool: PgPool) {
        let store = PgStore::from_pool(pool);
        let acme = ngo(&store, "acme").await;
        let bob = store
            .insert_user(new_user("bob", "bob@x.org", volunteer_profile()))
            .await
            .unwrap();
        let event = store
            .insert_event(NewEvent {
                title: "Park Planting".into(),
                description: "Plant trees".into(),
                date: "2024-05-01".into(),
                time: "10:00".into(),
                location: "City Park".into(),
                organizer_id: acme.id,
            })
            .await
            .unwrap();
        assert_eq!(event.status, EventStatus::Upcoming);

        let registration = Registration {
            event_id: event.id,
            user_id: bob.id,
        };
        store.register_for_event(registration).await.unwrap();
        store.register_for_event(registration).await.unwrap();

        let regs = store.registrations_for_events(&[event.id]).await.unwrap();
        assert_eq!(regs, vec![registration]);
        assert_eq!(store.event_ids_for_user(bob.id).await.unwrap(), vec![event.id]);
        assert_eq!(store.list_events(Some(&[event.id])).await.unwrap().len(), 1);
        assert_eq!(store.list_events(None).await.unwrap().len(), 1);
    }
}
