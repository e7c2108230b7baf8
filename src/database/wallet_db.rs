use super::db::{AppError, Database, DbAccess};
use crate::models::models::{NewWallet, NewWithdrawal, Wallet, Withdrawal};
use crate::models::schema::{wallets, withdrawals};
use crate::models::status::WithdrawalStatus;
use diesel::dsl::sum;
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

pub trait WalletImpl {
    /// Returns the user's wallet, creating an empty one on first access.
    fn get_or_create_wallet(&self, owner: Uuid) -> Result<Wallet, AppError>;

    /// Inserts a pending withdrawal if the wallet can cover it once every
    /// outstanding withdrawal is accounted for. The check and the insert are
    /// atomic with respect to other withdrawals of the same user.
    fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, AppError>;

    fn get_recent_withdrawals(&self, owner: Uuid, limit: i64) -> Result<Vec<Withdrawal>, AppError>;
}

fn ensure_wallet(conn: &mut PgConnection, owner: Uuid) -> QueryResult<usize> {
    diesel::insert_into(wallets::table)
        .values(&NewWallet {
            id: Uuid::new_v4(),
            user_id: owner,
        })
        .on_conflict(wallets::user_id)
        .do_nothing()
        .execute(conn)
}

fn outstanding_total(conn: &mut PgConnection, owner: Uuid) -> QueryResult<Decimal> {
    let total: Option<Decimal> = withdrawals::table
        .filter(withdrawals::user_id.eq(owner))
        .filter(
            withdrawals::status
                .eq(WithdrawalStatus::Pending)
                .or(withdrawals::status.eq(WithdrawalStatus::Processing)),
        )
        .select(sum(withdrawals::amount))
        .get_result(conn)?;

    Ok(total.unwrap_or(Decimal::ZERO))
}

impl WalletImpl for Database {
    fn get_or_create_wallet(&self, owner: Uuid) -> Result<Wallet, AppError> {
        let mut conn = self.conn()?;
        ensure_wallet(&mut conn, owner)?;

        wallets::table
            .filter(wallets::user_id.eq(owner))
            .first::<Wallet>(&mut conn)
            .map_err(AppError::DieselError)
    }

    fn create_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, AppError> {
        let mut conn = self.conn()?;

        conn.transaction::<Withdrawal, AppError, _>(|conn| {
            ensure_wallet(conn, withdrawal.user_id)?;

            // Serializes concurrent withdrawals of the same user on the wallet row.
            let wallet = wallets::table
                .filter(wallets::user_id.eq(withdrawal.user_id))
                .for_update()
                .first::<Wallet>(conn)?;

            let outstanding = outstanding_total(conn, withdrawal.user_id)?;
            let available = wallet.available_balance(outstanding);

            if withdrawal.amount > available {
                log::info!(
                    "Rejected withdrawal of {} for user {}: {} available",
                    withdrawal.amount,
                    withdrawal.user_id,
                    available
                );
                return Err(AppError::InsufficientBalance);
            }

            diesel::insert_into(withdrawals::table)
                .values(&withdrawal)
                .get_result(conn)
                .map_err(AppError::DieselError)
        })
    }

    fn get_recent_withdrawals(&self, owner: Uuid, limit: i64) -> Result<Vec<Withdrawal>, AppError> {
        let mut conn = self.conn()?;
        withdrawals::table
            .filter(withdrawals::user_id.eq(owner))
            .order(withdrawals::created_at.desc())
            .limit(limit)
            .load::<Withdrawal>(&mut conn)
            .map_err(AppError::DieselError)
    }
}
