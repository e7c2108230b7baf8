use actix_multipart::Multipart;
use actix_web::{get, patch, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::jwt_auth,
    database::db::AppError,
    helpers::{
        multipart_helpers::read_profile_submission,
        page_helpers::{redirect_back, redirect_with_flash, render_page, Flash},
        validation_helpers::FieldErrors,
    },
    models::{
        models::{
            FaqQuery, LoanApplication, LoanApplicationSchema, User, UserProfile, Wallet,
            Withdrawal, WithdrawalSchema,
        },
        response::{
            DashboardProps, FilteredLoanApplication, FilteredProfile, FilteredUser,
            FilteredWallet, FilteredWithdrawal, ProfileProps, WalletProps,
        },
    },
    service::{
        content_service::{faq_listing, home_content},
        loan_service::{submit_loan_application, LOAN_SUBMITTED, VERIFY_IDENTITY_FIRST},
        profile_service::{save_profile, SaveMode, PROFILE_SAVED},
        wallet_service::{
            request_withdrawal, wallet_overview, INSUFFICIENT_BALANCE, WITHDRAWAL_SUBMITTED,
        },
    },
    AppState,
};

fn filtered_user_record(user: &User) -> FilteredUser {
    FilteredUser {
        id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        verified: user.verified,
        created_at: user.created_at,
    }
}

fn filtered_profile_record(profile: &UserProfile) -> FilteredProfile {
    FilteredProfile {
        id: profile.id.to_string(),
        phone: profile.phone.clone(),
        nik: profile.nik.clone(),
        full_name: profile.full_name.clone(),
        address: profile.address.clone(),
        job: profile.job.clone(),
        monthly_income: profile.monthly_income,
        bank_name: profile.bank_name.clone(),
        bank_account: profile.bank_account.clone(),
        ktp_photo: profile.ktp_photo.clone(),
        selfie_photo: profile.selfie_photo.clone(),
        signature: profile.signature.clone(),
        is_verified: profile.is_verified,
        verified_at: profile.verified_at,
        updated_at: profile.updated_at,
    }
}

fn filtered_loan_record(loan: &LoanApplication) -> FilteredLoanApplication {
    FilteredLoanApplication {
        id: loan.id.to_string(),
        amount: loan.amount,
        term_months: loan.term_months,
        status: loan.status,
        approved_amount: loan.approved_amount,
        admin_notes: loan.admin_notes.clone(),
        approved_at: loan.approved_at,
        disbursed_at: loan.disbursed_at,
        created_at: loan.created_at,
    }
}

fn filtered_wallet_record(wallet: &Wallet) -> FilteredWallet {
    FilteredWallet {
        id: wallet.id.to_string(),
        balance: wallet.balance,
        total_received: wallet.total_received,
        total_withdrawn: wallet.total_withdrawn,
        updated_at: wallet.updated_at,
    }
}

fn filtered_withdrawal_record(withdrawal: &Withdrawal) -> FilteredWithdrawal {
    FilteredWithdrawal {
        id: withdrawal.id.to_string(),
        amount: withdrawal.amount,
        status: withdrawal.status,
        notes: withdrawal.notes.clone(),
        processed_at: withdrawal.processed_at,
        created_at: withdrawal.created_at,
    }
}

/// Field errors go back to the form; anything else is a real failure.
fn form_failure(req: &HttpRequest, fallback: &str, error: AppError) -> Result<HttpResponse, AppError> {
    match error {
        AppError::Validation(errors) => Ok(redirect_back(req, fallback, Flash::errors(errors))),
        AppError::InsufficientBalance => {
            let mut errors = FieldErrors::default();
            errors.add("amount", INSUFFICIENT_BALANCE);
            Ok(redirect_back(req, fallback, Flash::errors(errors)))
        }
        other => Err(other),
    }
}

#[get("/")]
pub async fn welcome_handler(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = data.db.clone();
    let content = web::block(move || home_content(db.as_ref())).await??;

    Ok(render_page(&req, "welcome", content))
}

#[get("/health-check")]
pub async fn health_check_handler() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

#[get("/faq")]
pub async fn faq_handler(
    req: HttpRequest,
    _auth: jwt_auth::JwtMiddleware,
    query: web::Query<FaqQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = data.db.clone();
    let category = query.into_inner().category;
    let listing = web::block(move || faq_listing(db.as_ref(), category.as_deref())).await??;

    Ok(render_page(&req, "faq/index", listing))
}

#[get("/dashboard")]
pub async fn dashboard_handler(
    req: HttpRequest,
    data: web::Data<AppState>,
    auth: jwt_auth::JwtMiddleware,
) -> Result<HttpResponse, AppError> {
    let user_id = auth.user_id;
    let db = data.db.clone();
    let loans = web::block(move || db.get_loan_applications_by_user_id(user_id)).await??;

    let props = DashboardProps {
        user: filtered_user_record(&auth.user),
        loan_applications: loans.iter().map(filtered_loan_record).collect(),
    };
    Ok(render_page(&req, "dashboard", props))
}

#[get("/wallet")]
pub async fn get_wallet_handler(
    req: HttpRequest,
    data: web::Data<AppState>,
    auth: jwt_auth::JwtMiddleware,
) -> Result<HttpResponse, AppError> {
    let user_id = auth.user_id;
    let db = data.db.clone();
    let overview = web::block(move || wallet_overview(db.as_ref(), user_id)).await??;

    let props = WalletProps {
        wallet: filtered_wallet_record(&overview.wallet),
        recent_withdrawals: overview
            .recent_withdrawals
            .iter()
            .map(filtered_withdrawal_record)
            .collect(),
        whatsapp_cs: data.env.whatsapp_cs.clone(),
    };
    Ok(render_page(&req, "wallet/index", props))
}

#[post("/wallet/withdraw")]
pub async fn withdraw_handler(
    req: HttpRequest,
    auth: jwt_auth::JwtMiddleware,
    body: web::Json<WithdrawalSchema>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = auth.user_id;
    let form = body.into_inner();
    let db = data.db.clone();

    match web::block(move || request_withdrawal(db.as_ref(), user_id, &form)).await? {
        Ok(_) => Ok(redirect_with_flash("/wallet", Flash::success(WITHDRAWAL_SUBMITTED))),
        Err(e) => form_failure(&req, "/wallet", e),
    }
}

#[post("/loan-application")]
pub async fn loan_application_handler(
    req: HttpRequest,
    auth: jwt_auth::JwtMiddleware,
    body: web::Json<LoanApplicationSchema>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = auth.user_id;
    let form = body.into_inner();
    let db = data.db.clone();

    match web::block(move || submit_loan_application(db.as_ref(), user_id, &form)).await? {
        Ok(_) => Ok(redirect_with_flash("/wallet", Flash::success(LOAN_SUBMITTED))),
        Err(AppError::ProfileNotVerified) => Ok(redirect_with_flash(
            "/profile/verify",
            Flash::message(VERIFY_IDENTITY_FIRST),
        )),
        Err(e) => form_failure(&req, "/", e),
    }
}

async fn profile_page(
    req: &HttpRequest,
    data: &web::Data<AppState>,
    auth: jwt_auth::JwtMiddleware,
    component: &'static str,
) -> Result<HttpResponse, AppError> {
    let user_id = auth.user_id;
    let db = data.db.clone();
    let profile = web::block(move || db.get_profile_by_user_id(user_id)).await??;

    let props = ProfileProps {
        user: filtered_user_record(&auth.user),
        profile: profile.as_ref().map(filtered_profile_record),
    };
    Ok(render_page(req, component, props))
}

#[get("/profile")]
pub async fn get_profile_handler(
    req: HttpRequest,
    data: web::Data<AppState>,
    auth: jwt_auth::JwtMiddleware,
) -> Result<HttpResponse, AppError> {
    profile_page(&req, &data, auth, "profile/index").await
}

#[get("/profile/verify")]
pub async fn verify_profile_handler(
    req: HttpRequest,
    data: web::Data<AppState>,
    auth: jwt_auth::JwtMiddleware,
) -> Result<HttpResponse, AppError> {
    profile_page(&req, &data, auth, "profile/verify").await
}

async fn submit_profile(
    req: &HttpRequest,
    payload: Multipart,
    data: &web::Data<AppState>,
    user_id: Uuid,
    mode: SaveMode,
) -> Result<HttpResponse, AppError> {
    let submission = read_profile_submission(payload).await?;
    let db = data.db.clone();
    let storage = data.storage.clone();

    let saved = web::block(move || {
        save_profile(db.as_ref(), storage.as_ref(), user_id, &submission, mode)
    })
    .await?;

    match saved {
        Ok(_) => Ok(redirect_with_flash("/profile", Flash::success(PROFILE_SAVED))),
        Err(e) => form_failure(req, "/profile/verify", e),
    }
}

#[post("/profile")]
pub async fn store_profile_handler(
    req: HttpRequest,
    auth: jwt_auth::JwtMiddleware,
    payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    submit_profile(&req, payload, &data, auth.user_id, SaveMode::Store).await
}

#[patch("/profile")]
pub async fn update_profile_handler(
    req: HttpRequest,
    auth: jwt_auth::JwtMiddleware,
    payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    submit_profile(&req, payload, &data, auth.user_id, SaveMode::Update).await
}
