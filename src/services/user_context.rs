use actix_web::{
    Error as ActixError, FromRequest, HttpRequest, dev::Payload, error::ErrorInternalServerError,
    web::Data,
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::database::models::{LeaveApplication, User};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::services::auth::Claims;

/// The authenticated user behind a request, loaded fresh from the database so
/// role changes apply without reissuing tokens.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user: User,
}

impl UserContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_leave_manager(&self) -> bool {
        self.user.role.is_leave_manager()
    }

    pub fn can_adjust_balances(&self) -> bool {
        self.user.role.can_adjust_balances()
    }

    /// Users can always reach their own records; leave managers reach everyone's.
    pub fn can_access_user_resource(&self, resource_owner_id: Uuid) -> bool {
        self.user_id() == resource_owner_id || self.is_leave_manager()
    }

    /// Whether this user may approve or reject `application`. Nobody decides
    /// their own leave.
    pub fn can_approve(&self, application: &LeaveApplication, applicant: &User) -> bool {
        if application.user_id == self.user_id() {
            return false;
        }

        applicant.leave_approver_id == Some(self.user_id())
            || applicant.parent_id == Some(self.user_id())
            || self.is_leave_manager()
    }
}

#[derive(Clone)]
pub struct UserContextService {
    user_repository: UserRepository,
}

impl UserContextService {
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    pub async fn from_claims(&self, claims: &Claims) -> Result<UserContext, AppError> {
        let user = self
            .user_repository
            .find_by_id(claims.user_id())
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(UserContext::new(user))
    }
}

impl FromRequest for UserContext {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let claims = Claims::from_request(req, payload).into_inner();
        let service = req.app_data::<Data<UserContextService>>().cloned();

        Box::pin(async move {
            let claims = claims?;
            let service = service.ok_or_else(|| {
                ErrorInternalServerError("UserContextService is not registered")
            })?;
            Ok(service.from_claims(&claims).await?)
        })
    }
}
