use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::content_db::ContentImpl;
use super::db::AppError;
use super::loan_db::LoanImpl;
use super::profile_db::ProfileImpl;
use super::user_db::UserImpl;
use super::wallet_db::WalletImpl;
use crate::helpers::validation_helpers::{NIK_TAKEN, PHONE_TAKEN};
use crate::models::models::{
    Banner, FaqArticle, LoanApplication, NewLoanApplication, NewUserProfile,
    NewWithdrawal, ProfilePatch, Testimonial, User, UserProfile, Wallet, Withdrawal,
};
use crate::models::status::WithdrawalStatus;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    profiles: Vec<UserProfile>,
    loans: Vec<LoanApplication>,
    wallets: Vec<Wallet>,
    withdrawals: Vec<Withdrawal>,
    faq_articles: Vec<FaqArticle>,
    testimonials: Vec<Testimonial>,
    banners: Vec<Banner>,
}

impl Tables {
    fn wallet_mut(&mut self, owner: Uuid) -> &mut Wallet {
        let index = match self.wallets.iter().position(|w| w.user_id == owner) {
            Some(index) => index,
            None => {
                let now = Utc::now();
                self.wallets.push(Wallet {
                    id: Uuid::new_v4(),
                    user_id: owner,
                    balance: Decimal::ZERO,
                    total_received: Decimal::ZERO,
                    total_withdrawn: Decimal::ZERO,
                    created_at: now,
                    updated_at: now,
                });
                self.wallets.len() - 1
            }
        };
        &mut self.wallets[index]
    }

    fn outstanding(&self, owner: Uuid) -> Decimal {
        self.withdrawals
            .iter()
            .filter(|w| w.user_id == owner && w.status.is_outstanding())
            .map(|w| w.amount)
            .sum()
    }

    fn check_profile_unique(
        &self,
        phone: Option<&str>,
        nik: Option<&str>,
        except: Option<Uuid>,
    ) -> Result<(), AppError> {
        let others = || self.profiles.iter().filter(move |p| Some(p.id) != except);

        if let Some(phone) = phone {
            if others().any(|p| p.phone == phone) {
                return Err(AppError::field("phone", PHONE_TAKEN));
            }
        }
        if let Some(nik) = nik {
            if others().any(|p| p.nik.as_deref() == Some(nik)) {
                return Err(AppError::field("nik", NIK_TAKEN));
            }
        }
        Ok(())
    }
}

/// Newest first; rows created in the same instant keep reverse insertion order.
fn newest_first<T: Clone>(rows: impl DoubleEndedIterator<Item = T>, created: fn(&T) -> i64) -> Vec<T> {
    let mut rows: Vec<T> = rows.rev().collect();
    rows.sort_by_key(|row| std::cmp::Reverse(created(row)));
    rows
}

/// In-process store with the same contract as [`super::db::Database`].
///
/// All tables sit behind one lock, so every trait method is atomic.
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, name: &str, email: &str, verified: bool) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            verified,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().users.push(user.clone());
        user
    }

    /// Stores a fully filled-in profile for `owner`.
    pub fn seed_profile(&self, owner: Uuid, phone: &str, nik: &str, verified: bool) -> UserProfile {
        let now = Utc::now();
        let profile = UserProfile {
            id: Uuid::new_v4(),
            user_id: owner,
            phone: phone.to_string(),
            nik: Some(nik.to_string()),
            full_name: Some("Budi Santoso".to_string()),
            address: Some("Jl. Merdeka No. 1, Jakarta".to_string()),
            job: Some("Karyawan Swasta".to_string()),
            monthly_income: Some(Decimal::from(5_000_000)),
            bank_name: Some("BCA".to_string()),
            bank_account: Some("1234567890".to_string()),
            ktp_photo: Some("documents/seed-ktp.jpg".to_string()),
            selfie_photo: Some("documents/seed-selfie.jpg".to_string()),
            signature: Some("signatures/seed-signature.png".to_string()),
            is_verified: verified,
            verified_at: if verified { Some(now) } else { None },
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().profiles.push(profile.clone());
        profile
    }

    /// Marks the profile verified, as an administrator would.
    pub fn verify_profile(&self, owner: Uuid) -> Option<UserProfile> {
        let mut tables = self.tables.lock();
        let profile = tables.profiles.iter_mut().find(|p| p.user_id == owner)?;
        profile.is_verified = true;
        profile.verified_at = Some(Utc::now());
        Some(profile.clone())
    }

    /// Sets the wallet ledger directly. `balance` is derived from the totals.
    pub fn seed_wallet(&self, owner: Uuid, total_received: Decimal, total_withdrawn: Decimal) -> Wallet {
        let mut tables = self.tables.lock();
        let wallet = tables.wallet_mut(owner);
        wallet.total_received = total_received;
        wallet.total_withdrawn = total_withdrawn;
        wallet.balance = total_received - total_withdrawn;
        wallet.updated_at = Utc::now();
        wallet.clone()
    }

    pub fn seed_withdrawal(&self, owner: Uuid, amount: Decimal, status: WithdrawalStatus) -> Withdrawal {
        let now = Utc::now();
        let withdrawal = Withdrawal {
            id: Uuid::new_v4(),
            user_id: owner,
            amount,
            verification_code: "SEED".to_string(),
            status,
            notes: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().withdrawals.push(withdrawal.clone());
        withdrawal
    }

    pub fn seed_faq(&self, title: &str, category: &str, is_active: bool, sort_order: i32) -> FaqArticle {
        let now = Utc::now();
        let article = FaqArticle {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: format!("Answer for {}", title),
            category: category.to_string(),
            is_active,
            sort_order,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().faq_articles.push(article.clone());
        article
    }

    pub fn seed_testimonial(&self, name: &str, is_active: bool, sort_order: i32) -> Testimonial {
        let now = Utc::now();
        let testimonial = Testimonial {
            id: Uuid::new_v4(),
            name: name.to_string(),
            content: "Fast and easy.".to_string(),
            rating: 5,
            location: Some("Jakarta".to_string()),
            is_active,
            sort_order,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().testimonials.push(testimonial.clone());
        testimonial
    }

    pub fn seed_banner(&self, title: &str, is_active: bool, sort_order: i32) -> Banner {
        let now = Utc::now();
        let banner = Banner {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            image: format!("banners/{}.jpg", sort_order),
            link_url: None,
            is_active,
            sort_order,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().banners.push(banner.clone());
        banner
    }

    pub fn withdrawal_count(&self, owner: Uuid) -> usize {
        self.tables
            .lock()
            .withdrawals
            .iter()
            .filter(|w| w.user_id == owner)
            .count()
    }
}

impl UserImpl for MemoryDatabase {
    fn get_user_by_id(&self, find_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self
            .tables
            .lock()
            .users
            .iter()
            .find(|u| u.id == find_id)
            .cloned())
    }
}

impl ProfileImpl for MemoryDatabase {
    fn get_profile_by_user_id(&self, owner: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .tables
            .lock()
            .profiles
            .iter()
            .find(|p| p.user_id == owner)
            .cloned())
    }

    fn phone_taken(&self, find_phone: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        Ok(self
            .tables
            .lock()
            .profiles
            .iter()
            .any(|p| p.phone == find_phone && Some(p.id) != except))
    }

    fn nik_taken(&self, find_nik: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        Ok(self
            .tables
            .lock()
            .profiles
            .iter()
            .any(|p| p.nik.as_deref() == Some(find_nik) && Some(p.id) != except))
    }

    fn create_profile(&self, profile: NewUserProfile) -> Result<UserProfile, AppError> {
        let mut tables = self.tables.lock();
        if tables.profiles.iter().any(|p| p.user_id == profile.user_id) {
            return Err(AppError::ProfileExists);
        }
        tables.check_profile_unique(Some(&profile.phone), profile.nik.as_deref(), None)?;

        let now = Utc::now();
        let created = UserProfile {
            id: profile.id,
            user_id: profile.user_id,
            phone: profile.phone,
            nik: profile.nik,
            full_name: profile.full_name,
            address: profile.address,
            job: profile.job,
            monthly_income: profile.monthly_income,
            bank_name: profile.bank_name,
            bank_account: profile.bank_account,
            ktp_photo: profile.ktp_photo,
            selfie_photo: profile.selfie_photo,
            signature: profile.signature,
            is_verified: false,
            verified_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(created.clone());
        Ok(created)
    }

    fn update_profile(
        &self,
        profile_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, AppError> {
        let mut tables = self.tables.lock();
        tables.check_profile_unique(patch.phone.as_deref(), patch.nik.as_deref(), Some(profile_id))?;

        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or(AppError::NotFound("profile"))?;
        profile.merge(patch);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }
}

impl LoanImpl for MemoryDatabase {
    fn create_loan_application(
        &self,
        application: NewLoanApplication,
    ) -> Result<LoanApplication, AppError> {
        let now = Utc::now();
        let created = LoanApplication {
            id: application.id,
            user_id: application.user_id,
            amount: application.amount,
            term_months: application.term_months,
            status: application.status,
            approved_amount: None,
            admin_notes: None,
            approved_at: None,
            disbursed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().loans.push(created.clone());
        Ok(created)
    }

    fn get_loan_applications_by_user_id(
        &self,
        owner: Uuid,
    ) -> Result<Vec<LoanApplication>, AppError> {
        let tables = self.tables.lock();
        Ok(newest_first(
            tables.loans.iter().filter(|l| l.user_id == owner).cloned(),
            |l| l.created_at.timestamp_micros(),
        ))
    }
}

impl WalletImpl for MemoryDatabase {
    fn get_or_create_wallet(&self, owner: Uuid) -> Result<Wallet, AppError> {
        Ok(self.tables.lock().wallet_mut(owner).clone())
    }

    fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, AppError> {
        let mut tables = self.tables.lock();
        let outstanding = tables.outstanding(withdrawal.user_id);
        let available = tables
            .wallet_mut(withdrawal.user_id)
            .available_balance(outstanding);

        if withdrawal.amount > available {
            return Err(AppError::InsufficientBalance);
        }

        let now = Utc::now();
        let created = Withdrawal {
            id: withdrawal.id,
            user_id: withdrawal.user_id,
            amount: withdrawal.amount,
            verification_code: withdrawal.verification_code,
            status: withdrawal.status,
            notes: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.withdrawals.push(created.clone());
        Ok(created)
    }

    fn get_recent_withdrawals(&self, owner: Uuid, limit: i64) -> Result<Vec<Withdrawal>, AppError> {
        let tables = self.tables.lock();
        let mut rows = newest_first(
            tables.withdrawals.iter().filter(|w| w.user_id == owner).cloned(),
            |w| w.created_at.timestamp_micros(),
        );
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}

impl ContentImpl for MemoryDatabase {
    fn get_active_banners(&self) -> Result<Vec<Banner>, AppError> {
        let mut rows: Vec<Banner> = self
            .tables
            .lock()
            .banners
            .iter()
            .filter(|b| b.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.sort_order);
        Ok(rows)
    }

    fn get_active_testimonials(&self) -> Result<Vec<Testimonial>, AppError> {
        let mut rows: Vec<Testimonial> = self
            .tables
            .lock()
            .testimonials
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.sort_order);
        Ok(rows)
    }

    fn get_active_faq_articles(&self, category: Option<&str>) -> Result<Vec<FaqArticle>, AppError> {
        let mut rows: Vec<FaqArticle> = self
            .tables
            .lock()
            .faq_articles
            .iter()
            .filter(|f| f.is_active)
            .filter(|f| category.map_or(true, |c| f.category == c))
            .cloned()
            .collect();
        rows.sort_by_key(|f| f.sort_order);
        Ok(rows)
    }

    fn get_active_faq_categories(&self) -> Result<Vec<String>, AppError> {
        let mut categories: Vec<String> = self
            .tables
            .lock()
            .faq_articles
            .iter()
            .filter(|f| f.is_active)
            .map(|f| f.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}
