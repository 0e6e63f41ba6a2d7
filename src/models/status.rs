//! Status vocabularies shared by catalog, copy, loan and penalty records
//!
//! Every status is a closed enum internally. The persisted and wire form is
//! the literal string vocabulary (`Active`, `InActive`, `Banned`, ...).

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres,
};
use utoipa::ToSchema;

/// Stores a status enum as its literal TEXT spelling
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// CatalogStatus
// ---------------------------------------------------------------------------

/// Status of books and catalog containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CatalogStatus {
    Active,
    InActive,
    Banned,
}

impl CatalogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogStatus::Active => "Active",
            CatalogStatus::InActive => "InActive",
            CatalogStatus::Banned => "Banned",
        }
    }

    /// Ordering used when several owners disagree: Banned > InActive > Active
    pub fn restrictiveness(&self) -> u8 {
        match self {
            CatalogStatus::Active => 0,
            CatalogStatus::InActive => 1,
            CatalogStatus::Banned => 2,
        }
    }

    /// The stricter of two statuses
    pub fn most_restrictive(self, other: CatalogStatus) -> CatalogStatus {
        if other.restrictiveness() > self.restrictiveness() {
            other
        } else {
            self
        }
    }
}

impl std::str::FromStr for CatalogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(CatalogStatus::Active),
            "InActive" => Ok(CatalogStatus::InActive),
            "Banned" => Ok(CatalogStatus::Banned),
            _ => Err(format!("Invalid catalog status: {}", s)),
        }
    }
}

text_column!(CatalogStatus);

// ---------------------------------------------------------------------------
// CopyStatus
// ---------------------------------------------------------------------------

/// Status of a physical book copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CopyStatus {
    Active,
    InActive,
    Banned,
    Borrowed,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Active => "Active",
            CopyStatus::InActive => "InActive",
            CopyStatus::Banned => "Banned",
            CopyStatus::Borrowed => "Borrowed",
        }
    }

    pub fn is_lendable(&self) -> bool {
        matches!(self, CopyStatus::Active)
    }
}

impl From<CatalogStatus> for CopyStatus {
    fn from(status: CatalogStatus) -> Self {
        match status {
            CatalogStatus::Active => CopyStatus::Active,
            CatalogStatus::InActive => CopyStatus::InActive,
            CatalogStatus::Banned => CopyStatus::Banned,
        }
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(CopyStatus::Active),
            "InActive" => Ok(CopyStatus::InActive),
            "Banned" => Ok(CopyStatus::Banned),
            "Borrowed" => Ok(CopyStatus::Borrowed),
            _ => Err(format!("Invalid copy status: {}", s)),
        }
    }
}

text_column!(CopyStatus);

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Loan state.
///
/// `Borrowed` is the initial state and `Returned` is terminal. `Other`
/// carries free text written through the unrestricted loan update, which
/// bypasses the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoanStatus {
    Borrowed,
    Returned,
    Lost,
    Damaged,
    Other(String),
}

impl LoanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LoanStatus::Borrowed => "Borrowed",
            LoanStatus::Returned => "Returned",
            LoanStatus::Lost => "Lost",
            LoanStatus::Damaged => "Damaged",
            LoanStatus::Other(s) => s.as_str(),
        }
    }

    /// Whether the transition table allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: &LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Borrowed, LoanStatus::Returned)
                | (LoanStatus::Borrowed, LoanStatus::Lost)
                | (LoanStatus::Borrowed, LoanStatus::Damaged)
                | (LoanStatus::Lost, LoanStatus::Returned)
                | (LoanStatus::Damaged, LoanStatus::Returned)
        )
    }

    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Borrowed)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Borrowed" => LoanStatus::Borrowed,
            "Returned" => LoanStatus::Returned,
            "Lost" => LoanStatus::Lost,
            "Damaged" => LoanStatus::Damaged,
            other => LoanStatus::Other(other.to_string()),
        })
    }
}

impl From<String> for LoanStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(_) => LoanStatus::Other(s),
        }
    }
}

impl From<LoanStatus> for String {
    fn from(status: LoanStatus) -> Self {
        match status {
            LoanStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

text_column!(LoanStatus);

// ---------------------------------------------------------------------------
// PenaltyType
// ---------------------------------------------------------------------------

/// Overdue severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PenaltyType {
    None,
    TenDays,
    TwoMonths,
    OneYear,
    Limitless,
}

impl PenaltyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PenaltyType::None => "None",
            PenaltyType::TenDays => "TenDays",
            PenaltyType::TwoMonths => "TwoMonths",
            PenaltyType::OneYear => "OneYear",
            PenaltyType::Limitless => "Limitless",
        }
    }
}

impl std::str::FromStr for PenaltyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Rows written by the legacy system carry a "Book" prefix
        match s.strip_prefix("Book").unwrap_or(s) {
            "None" => Ok(PenaltyType::None),
            "TenDays" => Ok(PenaltyType::TenDays),
            "TwoMonths" => Ok(PenaltyType::TwoMonths),
            "OneYear" => Ok(PenaltyType::OneYear),
            "Limitless" => Ok(PenaltyType::Limitless),
            _ => Err(format!("Invalid penalty type: {}", s)),
        }
    }
}

text_column!(PenaltyType);
