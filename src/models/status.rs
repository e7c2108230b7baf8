use std::io::Write;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::database::db::AppError;

/// Lifecycle of a loan application.
///
/// ```text
/// pending -> approved -> disbursed -> completed
///                                  \-> default
/// pending -> rejected
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    Disbursed,
    Completed,
    Default,
}

impl LoanStatus {
    pub fn can_transition_to(self, next: LoanStatus) -> bool {
        use LoanStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Disbursed)
                | (Disbursed, Completed)
                | (Disbursed, Default)
        )
    }

    pub fn transition_to(self, next: LoanStatus) -> Result<LoanStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition {
                entity: "loan application",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

/// Lifecycle of a withdrawal request.
///
/// ```text
/// pending -> processing -> completed
///                       \-> failed
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl WithdrawalStatus {
    pub fn can_transition_to(self, next: WithdrawalStatus) -> bool {
        use WithdrawalStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Completed) | (Processing, Failed)
        )
    }

    pub fn transition_to(self, next: WithdrawalStatus) -> Result<WithdrawalStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::InvalidTransition {
                entity: "withdrawal",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Still counts against the wallet balance.
    pub fn is_outstanding(self) -> bool {
        matches!(self, WithdrawalStatus::Pending | WithdrawalStatus::Processing)
    }
}

macro_rules! impl_text_sql {
    ($($t:ty), *) => {
        $(
            impl ToSql<Text, Pg> for $t {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                    let value: &'static str = self.into();
                    out.write_all(value.as_bytes())?;
                    Ok(IsNull::No)
                }
            }

            impl FromSql<Text, Pg> for $t {
                fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                    let raw = std::str::from_utf8(bytes.as_bytes())?;
                    <$t>::from_str(raw)
                        .map_err(|_| format!("unrecognized {} value: {}", stringify!($t), raw).into())
                }
            }
        )*
    };
}
impl_text_sql!(LoanStatus, WithdrawalStatus);
