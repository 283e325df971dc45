#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use futures_util::future::{BoxFuture, FutureExt};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use hrleave::database::init_database;
use hrleave::database::models::{NewUser, SubmitLeaveInput, User, UserRole};
use hrleave::database::repositories::UserRepository;
use hrleave::leave::{Days, HalfSession};
use hrleave::services::notifier::{LeaveNotification, Notifier};
use hrleave::services::{AuthService, UserContext, UserContextService};
use hrleave::{AppState, Config};

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

/// Collects notifications instead of sending them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<LeaveNotification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<LeaveNotification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify<'a>(&'a self, notification: &'a LeaveNotification) -> BoxFuture<'a, Result<()>> {
        self.sent.lock().unwrap().push(notification.clone());
        futures_util::future::ready(Ok(())).boxed()
    }
}

pub struct TestContext {
    pub db: TestDb,
    pub config: Config,
    pub state: actix_web::web::Data<AppState>,
    pub users: UserRepository,
    pub user_context: actix_web::web::Data<UserContextService>,
    pub auth: AuthService,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;
        let config = Config::test_config("sqlite::memory:");
        let notifier = Arc::new(RecordingNotifier::default());
        let state = actix_web::web::Data::new(AppState::new(
            db.pool.clone(),
            &config,
            notifier.clone(),
        ));
        let users = UserRepository::new(db.pool.clone());
        let user_context = actix_web::web::Data::new(UserContextService::new(users.clone()));
        let auth = AuthService::new(config.clone());

        Ok(TestContext {
            db,
            config,
            state,
            users,
            user_context,
            auth,
            notifier,
        })
    }

    pub async fn seed_user(&self, role: UserRole, leave_balance: i64) -> User {
        self.seed_user_with(NewUser {
            name: Name().fake(),
            email: String::new(),
            role: Some(role),
            leave_balance: Some(Days::whole(leave_balance)),
            comp_off_balance: None,
            leave_approver_id: None,
            parent_id: None,
        })
        .await
    }

    pub async fn seed_user_with(&self, mut input: NewUser) -> User {
        if input.email.is_empty() {
            let email: String = SafeEmail().fake();
            input.email = format!("{}.{}", Uuid::new_v4().simple(), email);
        }
        self.users
            .create_user(input, &self.config.default_leave_balance)
            .await
            .expect("seed user")
    }

    /// Re-read a user so balance assertions see committed state.
    pub async fn reload(&self, user: &User) -> User {
        self.users
            .find_by_id(user.id)
            .await
            .expect("query user")
            .expect("user exists")
    }

    pub fn context(&self, user: &User) -> UserContext {
        UserContext::new(user.clone())
    }

    pub fn token(&self, user: &User) -> String {
        self.auth.generate_token(user).expect("token")
    }

    pub fn bearer(&self, user: &User) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token(user)))
    }
}

/// Builds the full API around a [`TestContext`].
#[allow(unused_macros)]
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.user_context.clone())
                .app_data(actix_web::web::Data::new($ctx.config.clone()))
                .wrap(hrleave::middleware::RequestId)
                .configure(hrleave::routes::configure),
        )
        .await
    };
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A Monday at least a week after today, so every weekday of that week is
/// in the future.
pub fn future_monday() -> NaiveDate {
    let mut date = today() + Duration::days(7);
    while date.weekday() != Weekday::Mon {
        date += Duration::days(1);
    }
    date
}

pub fn full_days(start: NaiveDate, end: NaiveDate, leave_type: &str) -> SubmitLeaveInput {
    SubmitLeaveInput {
        start_date: start,
        end_date: end,
        day_type: None,
        start_half_session: None,
        end_half_session: None,
        leave_type: Some(leave_type.to_string()),
        reason: "Family trip out of town".to_string(),
    }
}

pub fn half_day(date: NaiveDate, session: HalfSession, leave_type: &str) -> SubmitLeaveInput {
    SubmitLeaveInput {
        start_half_session: Some(session),
        ..full_days(date, date, leave_type)
    }
}

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}
