use uuid::Uuid;

use crate::database::db::{AppError, Repository};
use crate::helpers::validation_helpers::validate_withdrawal;
use crate::models::models::{NewWithdrawal, Wallet, Withdrawal, WithdrawalSchema};
use crate::models::status::WithdrawalStatus;

pub const RECENT_WITHDRAWALS: i64 = 5;
pub const INSUFFICIENT_BALANCE: &str = "Insufficient balance";
pub const WITHDRAWAL_SUBMITTED: &str =
    "Withdrawal request submitted. Our CS team will contact you shortly.";

pub struct WalletOverview {
    pub wallet: Wallet,
    pub recent_withdrawals: Vec<Withdrawal>,
}

pub fn wallet_overview(db: &dyn Repository, user_id: Uuid) -> Result<WalletOverview, AppError> {
    let wallet = db.get_or_create_wallet(user_id)?;
    let recent_withdrawals = db.get_recent_withdrawals(user_id, RECENT_WITHDRAWALS)?;

    Ok(WalletOverview {
        wallet,
        recent_withdrawals,
    })
}

/// Records a pending withdrawal. The wallet balance is left untouched; it is
/// drawn down when the payout is processed.
pub fn request_withdrawal(
    db: &dyn Repository,
    user_id: Uuid,
    form: &WithdrawalSchema,
) -> Result<Withdrawal, AppError> {
    let (amount, verification_code) = validate_withdrawal(form)?;

    let withdrawal = db.create_withdrawal(NewWithdrawal {
        id: Uuid::new_v4(),
        user_id,
        amount,
        verification_code,
        status: WithdrawalStatus::Pending,
    })?;

    log::info!(
        "Withdrawal {} of {} requested by {}",
        withdrawal.id,
        amount,
        user_id
    );
    Ok(withdrawal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_db::MemoryDatabase;
    use rust_decimal::Decimal;

    fn form(amount: &str, code: &str) -> WithdrawalSchema {
        WithdrawalSchema {
            amount: Some(amount.to_string()),
            verification_code: Some(code.to_string()),
        }
    }

    #[test]
    fn pending_withdrawal_leaves_balance_unchanged() {
        let db = MemoryDatabase::new();
        let user = Uuid::new_v4();
        db.seed_wallet(user, Decimal::from(500_000), Decimal::ZERO);

        let withdrawal = request_withdrawal(&db, user, &form("100000", "ABCD")).unwrap();
        assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
        assert_eq!(withdrawal.amount, Decimal::from(100_000));

        let overview = wallet_overview(&db, user).unwrap();
        assert_eq!(overview.wallet.balance, Decimal::from(500_000));
        assert_eq!(overview.recent_withdrawals.len(), 1);
    }

    #[test]
    fn amount_above_balance_is_rejected_without_a_row() {
        let db = MemoryDatabase::new();
        let user = Uuid::new_v4();
        db.seed_wallet(user, Decimal::from(60_000), Decimal::ZERO);

        assert!(matches!(
            request_withdrawal(&db, user, &form("100000", "ABCD")),
            Err(AppError::InsufficientBalance)
        ));
        assert_eq!(db.withdrawal_count(user), 0);
    }

    #[test]
    fn overview_creates_wallet_and_keeps_latest_five() {
        let db = MemoryDatabase::new();
        let user = Uuid::new_v4();

        let empty = wallet_overview(&db, user).unwrap();
        assert_eq!(empty.wallet.balance, Decimal::ZERO);
        assert!(empty.recent_withdrawals.is_empty());

        for _ in 0..7 {
            db.seed_withdrawal(user, Decimal::from(50_000), WithdrawalStatus::Completed);
        }
        assert_eq!(wallet_overview(&db, user).unwrap().recent_withdrawals.len(), 5);
    }
}
