pub use accounts::AccountKind;
pub use error::LedgerError;
pub use money::MoneyCents;
pub use ops::{
    BudgetMonthCategoryRow, GoalUpdate, Ledger, LedgerBuilder, NewAccount, NewGoal, NewPayee,
    NewSchedule, NewTransaction, PayeeUpdate, ScheduleUpdate, SplitInfo, TagInfo,
    TransactionCategory, TransactionFilter, TransactionInfo, TransactionUpdate,
};
pub use payees::PayeeKind;
pub use schedules::ScheduleFrequency;
pub use splits::{SplitChangeSet, SplitDraft, SplitUpdate, reconcile_splits, validate_splits};
pub use transactions::TransactionStatus;

pub mod accounts;
pub mod budget_month_categories;
pub mod budget_months;
pub mod budgets;
pub mod categories;
mod error;
pub mod goals;
mod money;
mod ops;
pub mod payees;
pub mod schedules;
pub mod splits;
pub mod tags;
pub mod transaction_tags;
pub mod transactions;

type ResultLedger<T> = Result<T, LedgerError>;
