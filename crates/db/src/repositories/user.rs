//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::entities::users;

/// Name of the user created on a tenant's first `me` lookup.
pub const SERVICE_USER_NAME: &str = "Box Mock Service";

/// Login of the user created on a tenant's first `me` lookup.
pub const SERVICE_USER_LOGIN: &str = "service@boxmock.local";

/// Input for creating a user.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Login name.
    pub login: Option<String>,
    /// App user without a login of its own.
    pub is_platform_access_only: bool,
    /// Job title.
    pub job_title: Option<String>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, DbErr> {
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(input.name),
            email: Set(input.email),
            login: Set(input.login),
            is_platform_access_only: Set(input.is_platform_access_only),
            job_title: Set(input.job_title),
            created_at: Set(chrono::Utc::now()),
        };

        user.insert(&self.db).await
    }

    /// The current user: the tenant's first user, created on demand.
    ///
    /// The service user is inserted only while the table is empty, in a
    /// single statement, so racing callers never create two.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn me(&self) -> Result<users::Model, DbErr> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "INSERT INTO users (id, name, email, login, is_platform_access_only, job_title, created_at) \
             SELECT ?, ?, NULL, ?, ?, NULL, ? WHERE NOT EXISTS (SELECT 1 FROM users)",
            [
                Uuid::new_v4().to_string().into(),
                SERVICE_USER_NAME.into(),
                SERVICE_USER_LOGIN.into(),
                false.into(),
                chrono::Utc::now().into(),
            ],
        );
        self.db.execute(stmt).await?;

        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("users".to_string()))
    }

    /// Lists users, optionally filtered by a case-insensitive substring of
    /// name, email or login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter_term: Option<&str>) -> Result<Vec<users::Model>, DbErr> {
        let mut query = users::Entity::find();
        if let Some(term) = filter_term.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(users::Column::Name.contains(term))
                    .add(users::Column::Email.contains(term))
                    .add(users::Column::Login.contains(term)),
            );
        }

        query
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
    }

    /// Deletes a user. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, id: &str) -> Result<bool, DbErr> {
        let result = users::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Number of users in the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        users::Entity::find().count(&self.db).await
    }
}
