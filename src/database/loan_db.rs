use super::db::{AppError, Database, DbAccess};
use crate::models::models::{LoanApplication, NewLoanApplication};
use crate::models::schema::loan_applications::dsl::*;
use diesel::prelude::*;
use uuid::Uuid;

pub trait LoanImpl {
    fn create_loan_application(
        &self,
        application: NewLoanApplication,
    ) -> Result<LoanApplication, AppError>;

    /// Newest first.
    fn get_loan_applications_by_user_id(
        &self,
        owner: Uuid,
    ) -> Result<Vec<LoanApplication>, AppError>;
}

impl LoanImpl for Database {
    fn create_loan_application(
        &self,
        application: NewLoanApplication,
    ) -> Result<LoanApplication, AppError> {
        let mut conn = self.conn()?;
        diesel::insert_into(loan_applications)
            .values(&application)
            .get_result(&mut conn)
            .map_err(AppError::DieselError)
    }

    fn get_loan_applications_by_user_id(
        &self,
        owner: Uuid,
    ) -> Result<Vec<LoanApplication>, AppError> {
        let mut conn = self.conn()?;
        loan_applications
            .filter(user_id.eq(owner))
            .order(created_at.desc())
            .load::<LoanApplication>(&mut conn)
            .map_err(AppError::DieselError)
    }
}
