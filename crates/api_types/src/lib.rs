use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response body for every create endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Cash,
        Checking,
        Savings,
        CreditCard,
        LineOfCredit,
        Mortgage,
        Loan,
        Asset,
        Liability,
    }

    impl AccountKind {
        /// Returns the canonical kind string used by the ledger/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Cash => "cash",
                Self::Checking => "checking",
                Self::Savings => "savings",
                Self::CreditCard => "credit_card",
                Self::LineOfCredit => "line_of_credit",
                Self::Mortgage => "mortgage",
                Self::Loan => "loan",
                Self::Asset => "asset",
                Self::Liability => "liability",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub kind: AccountKind,
        /// Tracked accounts take part in budgets and carry splits.
        pub tracked: bool,
        /// Posted as an opening transaction against the Starting Balance payee.
        pub opening_balance_minor: i64,
    }

    /// Rename request. Kind and tracking are fixed at creation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub account_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
        pub tracked: bool,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountBalance {
        pub balance_minor: i64,
    }
}

pub mod payee {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeeNew {
        pub name: String,
        pub default_category_id: Option<Uuid>,
    }

    /// Update request. An absent `default_category_id` leaves the stored
    /// default untouched.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeeUpdate {
        pub payee_id: Uuid,
        pub name: String,
        pub default_category_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PayeeView {
        pub id: Uuid,
        pub name: String,
        pub default_category_id: Option<Uuid>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub category_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        /// Seeded categories (Income) refuse renames and deletion.
        pub is_editable: bool,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagUpdate {
        pub tag_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagView {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Cleared,
    }

    impl TransactionStatus {
        /// Returns the canonical status string used by the ledger/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Cleared => "cleared",
            }
        }
    }

    /// One split of a transaction amount.
    ///
    /// Splits must sum to the transaction amount and `order` must run
    /// 0..n without gaps.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitNew {
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub notes: Option<String>,
        pub order: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Posting date, `YYYY-MM-DD`.
        pub posted_on: NaiveDate,
        pub account_id: Uuid,
        pub payee_id: Uuid,
        pub amount_minor: i64,
        pub notes: Option<String>,
        pub status: TransactionStatus,
        /// Required for tracked accounts, ignored for untracked ones.
        pub splits: Vec<SplitNew>,
        pub tags: Vec<Uuid>,
    }

    /// Full-replacement update: every field is written as sent, tags and
    /// splits are replaced wholesale and absent `notes` clears the stored
    /// ones.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub transaction_id: Uuid,
        pub posted_on: NaiveDate,
        pub account_id: Uuid,
        pub payee_id: Uuid,
        pub amount_minor: i64,
        pub notes: Option<String>,
        pub status: TransactionStatus,
        pub splits: Vec<SplitNew>,
        pub tags: Vec<Uuid>,
    }

    /// One transaction with account, payee, category and tag names
    /// resolved.
    ///
    /// A single-split transaction reports that split's category in
    /// `category_id`/`category_name` with an empty `splits` list; a
    /// multi-split one reports `category_name = "Split"` and the ordered
    /// list.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub posted_on: NaiveDate,
        pub account_id: Option<Uuid>,
        pub account_name: Option<String>,
        pub payee_id: Uuid,
        pub payee_name: String,
        pub amount_minor: i64,
        pub notes: Option<String>,
        pub status: TransactionStatus,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub tags: Vec<TransactionTagView>,
        pub splits: Vec<SplitView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionTagView {
        pub tag_id: Uuid,
        pub tag_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub category_id: Uuid,
        pub category_name: String,
        pub amount_minor: i64,
        pub notes: Option<String>,
        pub order: i32,
    }

    /// Request body for reassigning every transaction of one payee to
    /// another.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MoveToPayee {
        pub old_payee_id: Uuid,
        pub new_payee_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MoveToPayeeResult {
        pub moved: u64,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub budget_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
    }

    /// One category line of a budget month.
    ///
    /// `spent_minor` sums tracked-account splits over the month;
    /// `available_minor` is budgeted minus spent.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetMonthCategoryView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub category_name: String,
        pub budgeted_minor: i64,
        pub spent_minor: i64,
        pub available_minor: i64,
    }

    /// Sets the budgeted amount of one category in one month, creating
    /// the month on first use.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetMonthUpdate {
        pub budget_id: Uuid,
        pub year: i32,
        pub month: i32,
        pub category_id: Uuid,
        pub budgeted_minor: i64,
    }
}

pub mod schedule {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ScheduleFrequency {
        Year,
        Month,
        Week,
        Day,
    }

    impl ScheduleFrequency {
        /// Returns the canonical frequency string used by the ledger/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Year => "year",
                Self::Month => "month",
                Self::Week => "week",
                Self::Day => "day",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleNew {
        pub frequency: ScheduleFrequency,
        pub interval: i32,
        pub display_name: String,
        pub display_order: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleUpdate {
        pub schedule_id: Uuid,
        pub frequency: ScheduleFrequency,
        pub interval: i32,
        pub display_name: String,
        pub display_order: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleView {
        pub id: Uuid,
        pub frequency: ScheduleFrequency,
        pub interval: i32,
        pub display_name: String,
        pub display_order: i32,
        pub is_editable: bool,
    }
}

pub mod goal {
    use super::*;

    /// Query string of the goal listing. `archived = true` selects the
    /// archive instead of the live goals.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalList {
        pub archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub description: Option<String>,
        pub category_id: Uuid,
        pub amount_minor: Option<i64>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub schedule_id: Option<Uuid>,
    }

    /// Full-replacement update: absent optional fields clear the stored
    /// values.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalUpdate {
        pub goal_id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub category_id: Uuid,
        pub amount_minor: Option<i64>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub schedule_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub category_id: Uuid,
        pub amount_minor: Option<i64>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub schedule_id: Option<Uuid>,
    }
}
