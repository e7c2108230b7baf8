use super::db::{AppError, Database, DbAccess};
use crate::models::models::User;
use crate::models::schema::users::dsl::*;
use diesel::prelude::*;
use uuid::Uuid;

pub trait UserImpl {
    fn get_user_by_id(&self, find_id: Uuid) -> Result<Option<User>, AppError>;
}

impl UserImpl for Database {
    fn get_user_by_id(&self, find_id: Uuid) -> Result<Option<User>, AppError> {
        let mut conn = self.conn()?;
        users
            .find(find_id)
            .first::<User>(&mut conn)
            .optional()
            .map_err(AppError::DieselError)
    }
}
