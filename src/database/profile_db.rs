use super::db::{violated_unique_constraint, AppError, Database, DbAccess};
use crate::helpers::validation_helpers::{NIK_TAKEN, PHONE_TAKEN};
use crate::models::models::{NewUserProfile, ProfilePatch, UserProfile};
use crate::models::schema::user_profiles::dsl::*;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use uuid::Uuid;

pub trait ProfileImpl {
    fn get_profile_by_user_id(&self, owner: Uuid) -> Result<Option<UserProfile>, AppError>;

    /// Whether another profile (other than `except`) already uses this phone.
    fn phone_taken(&self, find_phone: &str, except: Option<Uuid>) -> Result<bool, AppError>;

    fn nik_taken(&self, find_nik: &str, except: Option<Uuid>) -> Result<bool, AppError>;

    fn create_profile(&self, profile: NewUserProfile) -> Result<UserProfile, AppError>;

    fn update_profile(
        &self,
        profile_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, AppError>;
}

/// Turns a unique-index violation into the same field error the up-front
/// uniqueness check would have produced. A second row for the same owner
/// becomes `ProfileExists`.
fn map_profile_error(e: diesel::result::Error) -> AppError {
    match violated_unique_constraint(&e) {
        Some("user_profiles_phone_key") => AppError::field("phone", PHONE_TAKEN),
        Some("user_profiles_nik_key") => AppError::field("nik", NIK_TAKEN),
        Some("user_profiles_user_id_key") => AppError::ProfileExists,
        _ => AppError::DieselError(e),
    }
}

impl ProfileImpl for Database {
    fn get_profile_by_user_id(&self, owner: Uuid) -> Result<Option<UserProfile>, AppError> {
        let mut conn = self.conn()?;
        user_profiles
            .filter(user_id.eq(owner))
            .first::<UserProfile>(&mut conn)
            .optional()
            .map_err(AppError::DieselError)
    }

    fn phone_taken(&self, find_phone: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let mut conn = self.conn()?;
        // The nil id never belongs to a stored profile.
        let except_id = except.unwrap_or_else(Uuid::nil);

        diesel::select(exists(
            user_profiles
                .filter(phone.eq(find_phone))
                .filter(id.ne(except_id)),
        ))
        .get_result(&mut conn)
        .map_err(AppError::DieselError)
    }

    fn nik_taken(&self, find_nik: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let mut conn = self.conn()?;
        // The nil id never belongs to a stored profile.
        let except_id = except.unwrap_or_else(Uuid::nil);

        diesel::select(exists(
            user_profiles
                .filter(nik.eq(find_nik))
                .filter(id.ne(except_id)),
        ))
        .get_result(&mut conn)
        .map_err(AppError::DieselError)
    }

    fn create_profile(&self, profile: NewUserProfile) -> Result<UserProfile, AppError> {
        let mut conn = self.conn()?;
        diesel::insert_into(user_profiles)
            .values(&profile)
            .get_result(&mut conn)
            .map_err(map_profile_error)
    }

    fn update_profile(
        &self,
        profile_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, AppError> {
        let mut conn = self.conn()?;
        diesel::update(user_profiles.find(profile_id))
            .set((patch, updated_at.eq(Utc::now())))
            .get_result(&mut conn)
            .map_err(map_profile_error)
    }
}
