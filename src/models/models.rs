use chrono::prelude::*;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{
    banners, faq_articles, loan_applications, testimonials, user_profiles, users, wallets,
    withdrawals,
};
use super::status::{LoanStatus, WithdrawalStatus};
use crate::helpers::form_helpers::string_or_number;

#[derive(Debug, Serialize, Deserialize, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = user_profiles)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_profiles)]
pub struct NewUserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
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
}

/// Validated, owner-editable profile fields. `None` means "leave unchanged";
/// the same struct doubles as the diesel changeset, which skips `None` columns.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = user_profiles)]
pub struct ProfilePatch {
    pub phone: Option<String>,
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
}

impl ProfilePatch {
    pub fn into_new_profile(self, id: Uuid, user_id: Uuid) -> Option<NewUserProfile> {
        Some(NewUserProfile {
            id,
            user_id,
            phone: self.phone?,
            nik: self.nik,
            full_name: self.full_name,
            address: self.address,
            job: self.job,
            monthly_income: self.monthly_income,
            bank_name: self.bank_name,
            bank_account: self.bank_account,
            ktp_photo: self.ktp_photo,
            selfie_photo: self.selfie_photo,
            signature: self.signature,
        })
    }
}

impl UserProfile {
    /// Apply a partial update. Fields absent from the patch keep their value;
    /// verification state is never touched.
    pub fn merge(&mut self, patch: &ProfilePatch) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        set(&mut self.phone, &patch.phone);
        set_opt(&mut self.nik, &patch.nik);
        set_opt(&mut self.full_name, &patch.full_name);
        set_opt(&mut self.address, &patch.address);
        set_opt(&mut self.job, &patch.job);
        set_opt(&mut self.monthly_income, &patch.monthly_income);
        set_opt(&mut self.bank_name, &patch.bank_name);
        set_opt(&mut self.bank_account, &patch.bank_account);
        set_opt(&mut self.ktp_photo, &patch.ktp_photo);
        set_opt(&mut self.selfie_photo, &patch.selfie_photo);
        set_opt(&mut self.signature, &patch.signature);
    }

    /// Document paths that `patch` would replace.
    pub fn superseded_documents(&self, patch: &ProfilePatch) -> Vec<String> {
        let pairs = [
            (&self.ktp_photo, &patch.ktp_photo),
            (&self.selfie_photo, &patch.selfie_photo),
            (&self.signature, &patch.signature),
        ];

        pairs
            .into_iter()
            .filter_map(|(current, next)| match (current, next) {
                (Some(current), Some(next)) if current != next => Some(current.clone()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = loan_applications)]
pub struct LoanApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub term_months: i32,
    pub status: LoanStatus,
    pub approved_amount: Option<Decimal>,
    pub admin_notes: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub disbursed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loan_applications)]
pub struct NewLoanApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub term_months: i32,
    pub status: LoanStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = wallets)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub total_received: Decimal,
    pub total_withdrawn: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    #[cfg(test)]
    pub fn is_balanced(&self) -> bool {
        self.balance == self.total_received - self.total_withdrawn
    }

    /// Balance left once withdrawals that are still in flight are paid out.
    pub fn available_balance(&self, outstanding: Decimal) -> Decimal {
        (self.balance - outstanding).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallets)]
pub struct NewWallet {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = withdrawals)]
pub struct Withdrawal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub verification_code: String,
    pub status: WithdrawalStatus,
    pub notes: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = withdrawals)]
pub struct NewWithdrawal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub verification_code: String,
    pub status: WithdrawalStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = faq_articles)]
pub struct FaqArticle {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = testimonials)]
pub struct Testimonial {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub rating: i32,
    pub location: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = banners)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/*      JSONWEBTOKEN TOKEN DECODE PARAMS     */
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/*  REQUEST SCHEMAS */
#[derive(Debug, Default, Deserialize)]
pub struct LoanApplicationSchema {
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub term_months: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WithdrawalSchema {
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub verification_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FaqQuery {
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            phone: "081234567890".to_string(),
            nik: Some("3171234567890001".to_string()),
            full_name: Some("Budi Santoso".to_string()),
            address: Some("Jl. Merdeka 1".to_string()),
            job: Some("Guru".to_string()),
            monthly_income: Some(Decimal::from(5_000_000)),
            bank_name: Some("BCA".to_string()),
            bank_account: Some("1234567890".to_string()),
            ktp_photo: Some("documents/ktp.jpg".to_string()),
            selfie_photo: Some("documents/selfie.jpg".to_string()),
            signature: Some("signatures/sign.png".to_string()),
            is_verified: true,
            verified_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn merge_only_touches_supplied_fields() {
        let mut current = profile();
        let before = current.clone();

        current.merge(&ProfilePatch {
            job: Some("Pedagang".to_string()),
            bank_account: Some("999".to_string()),
            ..Default::default()
        });

        assert_eq!(current.job.as_deref(), Some("Pedagang"));
        assert_eq!(current.bank_account.as_deref(), Some("999"));
        assert_eq!(current.phone, before.phone);
        assert_eq!(current.nik, before.nik);
        assert_eq!(current.ktp_photo, before.ktp_photo);
        assert!(current.is_verified);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut current = profile();
        let before = current.clone();
        current.merge(&ProfilePatch::default());
        assert_eq!(current, before);
    }

    #[test]
    fn superseded_documents_lists_replaced_files_only() {
        let current = profile();
        let patch = ProfilePatch {
            ktp_photo: Some("documents/new-ktp.jpg".to_string()),
            signature: Some("signatures/sign.png".to_string()),
            ..Default::default()
        };
        assert_eq!(
            current.superseded_documents(&patch),
            vec!["documents/ktp.jpg".to_string()]
        );
    }

    #[test]
    fn new_profile_requires_phone() {
        let user_id = Uuid::new_v4();
        assert!(ProfilePatch::default()
            .into_new_profile(Uuid::new_v4(), user_id)
            .is_none());

        let created = ProfilePatch {
            phone: Some("081234567890".to_string()),
            ..Default::default()
        }
        .into_new_profile(Uuid::new_v4(), user_id)
        .unwrap();
        assert_eq!(created.user_id, user_id);
    }

    #[test]
    fn wallet_available_balance_discounts_outstanding() {
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance: Decimal::from(500_000),
            total_received: Decimal::from(600_000),
            total_withdrawn: Decimal::from(100_000),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(wallet.is_balanced());
        assert_eq!(
            wallet.available_balance(Decimal::from(200_000)),
            Decimal::from(300_000)
        );
        assert_eq!(
            wallet.available_balance(Decimal::from(900_000)),
            Decimal::ZERO
        );
    }
}
