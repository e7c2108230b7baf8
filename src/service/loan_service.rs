use uuid::Uuid;

use crate::database::db::{AppError, Repository};
use crate::helpers::validation_helpers::validate_loan_application;
use crate::models::models::{LoanApplication, LoanApplicationSchema, NewLoanApplication};
use crate::models::status::LoanStatus;

pub const VERIFY_IDENTITY_FIRST: &str = "Please complete your identity verification first.";
pub const LOAN_SUBMITTED: &str =
    "Loan application submitted successfully. Please wait for approval.";

/// Validates the form, then creates a pending application for users whose
/// identity has been verified. Nothing is written on any failure.
pub fn submit_loan_application(
    db: &dyn Repository,
    user_id: Uuid,
    form: &LoanApplicationSchema,
) -> Result<LoanApplication, AppError> {
    let (amount, term_months) = validate_loan_application(form)?;

    let verified = db
        .get_profile_by_user_id(user_id)?
        .map_or(false, |profile| profile.is_verified);
    if !verified {
        log::info!("Loan application refused for unverified user {}", user_id);
        return Err(AppError::ProfileNotVerified);
    }

    let application = db.create_loan_application(NewLoanApplication {
        id: Uuid::new_v4(),
        user_id,
        amount,
        term_months,
        status: LoanStatus::Pending,
    })?;

    log::info!(
        "Loan application {} submitted by {}: {} over {} months",
        application.id,
        user_id,
        amount,
        term_months
    );
    Ok(application)
}
