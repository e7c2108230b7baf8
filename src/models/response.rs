use chrono::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use super::status::{LoanStatus, WithdrawalStatus};

#[derive(Debug, Serialize)]
pub struct FilteredUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FilteredProfile {
    pub id: String,
    pub phone: String,
    pub nik: Option<String>,
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub job: Option<String>,
    pub monthly_income: Option<Decimal>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub ktp_photo: Option<String>,
    pub selfie_photo: Option<String>,
    pub signature: Option<String>,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FilteredLoanApplication {
    pub id: String,
    pub amount: Decimal,
    pub term_months: i32,
    pub status: LoanStatus,
    pub approved_amount: Option<Decimal>,
    pub admin_notes: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub disbursed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FilteredWallet {
    pub id: String,
    pub balance: Decimal,
    pub total_received: Decimal,
    pub total_withdrawn: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Withdrawal as shown to its owner; the verification code stays server side.
#[derive(Debug, Serialize)]
pub struct FilteredWithdrawal {
    pub id: String,
    pub amount: Decimal,
    pub status: WithdrawalStatus,
    pub notes: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/*  PAGE PROPS  */
#[derive(Debug, Serialize)]
pub struct DashboardProps {
    pub user: FilteredUser,
    pub loan_applications: Vec<FilteredLoanApplication>,
}

#[derive(Debug, Serialize)]
pub struct WalletProps {
    pub wallet: FilteredWallet,
    pub recent_withdrawals: Vec<FilteredWithdrawal>,
    pub whatsapp_cs: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileProps {
    pub user: FilteredUser,
    pub profile: Option<FilteredProfile>,
}
