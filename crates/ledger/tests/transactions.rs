use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use ledger::{
    AccountKind, Ledger, LedgerError, MoneyCents, NewAccount, NewGoal, NewPayee, NewSchedule,
    NewTransaction, ScheduleFrequency, SplitDraft, TransactionCategory, TransactionFilter,
    TransactionStatus, TransactionUpdate,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (ledger, db)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn split(category_id: Uuid, cents: i64, position: i32) -> SplitDraft {
    SplitDraft {
        category_id,
        amount: MoneyCents::new(cents),
        notes: None,
        position,
    }
}

fn transaction(
    account_id: Uuid,
    payee_id: Uuid,
    cents: i64,
    splits: Vec<SplitDraft>,
) -> NewTransaction {
    NewTransaction {
        posted_on: date(2026, 3, 14),
        account_id,
        payee_id,
        amount: MoneyCents::new(cents),
        notes: None,
        status: TransactionStatus::Cleared,
        tags: Vec::new(),
        splits,
    }
}

async fn new_account(ledger: &Ledger, name: &str, tracked: bool) -> Uuid {
    ledger
        .new_account(NewAccount {
            name: name.to_string(),
            kind: AccountKind::Checking,
            tracked,
            opening_balance: MoneyCents::ZERO,
        })
        .await
        .unwrap()
}

async fn new_payee(ledger: &Ledger, name: &str) -> Uuid {
    ledger
        .new_payee(NewPayee {
            name: name.to_string(),
            default_category_id: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn tracked_account_opening_balance_posts_starting_transaction() {
    let (ledger, _db) = ledger_with_db().await;

    let account_id = ledger
        .new_account(NewAccount {
            name: "Checking".to_string(),
            kind: AccountKind::Checking,
            tracked: true,
            opening_balance: MoneyCents::new(50_00),
        })
        .await
        .unwrap();

    let balance = ledger.account_balance(account_id).await.unwrap();
    assert_eq!(balance, MoneyCents::new(50_00));

    let infos = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].payee, "Starting Balance");
    assert_eq!(infos[0].amount, MoneyCents::new(50_00));
    assert_eq!(infos[0].status, TransactionStatus::Cleared);
    match &infos[0].category {
        TransactionCategory::Single { name, .. } => assert_eq!(name, "Income"),
        other => panic!("expected single Income category, got {other:?}"),
    }
}

#[tokio::test]
async fn untracked_account_opening_balance_carries_no_splits() {
    let (ledger, _db) = ledger_with_db().await;

    let account_id = ledger
        .new_account(NewAccount {
            name: "Cash jar".to_string(),
            kind: AccountKind::Cash,
            tracked: false,
            opening_balance: MoneyCents::new(20_00),
        })
        .await
        .unwrap();

    assert_eq!(
        ledger.account_balance(account_id).await.unwrap(),
        MoneyCents::new(20_00)
    );

    let infos = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].category, TransactionCategory::None);
}

#[tokio::test]
async fn transaction_lifecycle_keeps_balance_consistent() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = new_account(&ledger, "Checking", true).await;
    let payee_id = new_payee(&ledger, "Employer").await;
    let grocer_id = new_payee(&ledger, "Grocer").await;
    let salary = ledger.new_category("Salary").await.unwrap();
    let food = ledger.new_category("Food").await.unwrap();
    let fuel = ledger.new_category("Fuel").await.unwrap();

    // Deposit 100.00 split 60/40.
    ledger
        .new_transaction(transaction(
            account_id,
            payee_id,
            100_00,
            vec![split(salary, 60_00, 0), split(fuel, 40_00, 1)],
        ))
        .await
        .unwrap();
    assert_eq!(
        ledger.account_balance(account_id).await.unwrap(),
        MoneyCents::new(100_00)
    );

    // Spend 40.00.
    let spend_id = ledger
        .new_transaction(transaction(
            account_id,
            grocer_id,
            -40_00,
            vec![split(food, -40_00, 0)],
        ))
        .await
        .unwrap();
    assert_eq!(
        ledger.account_balance(account_id).await.unwrap(),
        MoneyCents::new(60_00)
    );

    // Correct the spend to 25.00.
    ledger
        .update_transaction(
            spend_id,
            TransactionUpdate {
                amount: Some(MoneyCents::new(-25_00)),
                splits: Some(vec![split(food, -25_00, 0)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        ledger.account_balance(account_id).await.unwrap(),
        MoneyCents::new(75_00)
    );

    // Delete the spend; deleting again is a no-op.
    ledger.delete_transaction(spend_id).await.unwrap();
    assert_eq!(
        ledger.account_balance(account_id).await.unwrap(),
        MoneyCents::new(100_00)
    );
    ledger.delete_transaction(spend_id).await.unwrap();

    let infos = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    assert_eq!(infos.len(), 1);
}

#[tokio::test]
async fn reconcile_updates_changed_split_row_in_place() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = new_account(&ledger, "Checking", true).await;
    let payee_id = new_payee(&ledger, "Grocer").await;
    let food = ledger.new_category("Food").await.unwrap();
    let fuel = ledger.new_category("Fuel").await.unwrap();
    let household = ledger.new_category("Household").await.unwrap();

    let transaction_id = ledger
        .new_transaction(transaction(
            account_id,
            payee_id,
            -100_00,
            vec![split(food, -60_00, 0), split(fuel, -40_00, 1)],
        ))
        .await
        .unwrap();

    let before = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    let TransactionCategory::Split(before_splits) = &before[0].category else {
        panic!("expected split category");
    };
    assert_eq!(before_splits.len(), 2);

    // Same amounts and order, only the category at position 1 changes.
    ledger
        .update_transaction(
            transaction_id,
            TransactionUpdate {
                splits: Some(vec![split(food, -60_00, 0), split(household, -40_00, 1)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    let TransactionCategory::Split(after_splits) = &after[0].category else {
        panic!("expected split category");
    };

    // The rows were updated, not recreated.
    assert_eq!(after_splits[0].id, before_splits[0].id);
    assert_eq!(after_splits[1].id, before_splits[1].id);
    assert_eq!(after_splits[0].category, "Food");
    assert_eq!(after_splits[1].category, "Household");
    assert_eq!(after_splits[1].amount, MoneyCents::new(-40_00));
}

#[tokio::test]
async fn rejected_splits_leave_no_partial_writes() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = new_account(&ledger, "Checking", true).await;
    let payee_id = new_payee(&ledger, "Grocer").await;
    let food = ledger.new_category("Food").await.unwrap();

    // Sum mismatch.
    let err = ledger
        .new_transaction(transaction(
            account_id,
            payee_id,
            -100_00,
            vec![split(food, -90_00, 0)],
        ))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidSplitTotal);

    // Position gap.
    let err = ledger
        .new_transaction(transaction(
            account_id,
            payee_id,
            -100_00,
            vec![split(food, -60_00, 0), split(food, -40_00, 2)],
        ))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidSplitOrder);

    let infos = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    assert!(infos.is_empty());
    assert_eq!(
        ledger.account_balance(account_id).await.unwrap(),
        MoneyCents::ZERO
    );
}

#[tokio::test]
async fn untracked_account_never_carries_splits() {
    let (ledger, _db) = ledger_with_db().await;
    let tracked_id = new_account(&ledger, "Checking", true).await;
    let untracked_id = new_account(&ledger, "Cash jar", false).await;
    let payee_id = new_payee(&ledger, "Grocer").await;
    let food = ledger.new_category("Food").await.unwrap();

    // Splits handed to an untracked account are dropped silently.
    let loose_id = ledger
        .new_transaction(transaction(
            untracked_id,
            payee_id,
            -10_00,
            vec![split(food, -10_00, 0)],
        ))
        .await
        .unwrap();
    let infos = ledger
        .list_transactions(TransactionFilter::Account(untracked_id))
        .await
        .unwrap();
    assert_eq!(infos[0].id, loose_id);
    assert_eq!(infos[0].category, TransactionCategory::None);

    // Moving a split transaction onto an untracked account removes its splits.
    let tracked_tx = ledger
        .new_transaction(transaction(
            tracked_id,
            payee_id,
            -20_00,
            vec![split(food, -20_00, 0)],
        ))
        .await
        .unwrap();
    ledger
        .update_transaction(
            tracked_tx,
            TransactionUpdate {
                account_id: Some(untracked_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let infos = ledger
        .list_transactions(TransactionFilter::Account(untracked_id))
        .await
        .unwrap();
    let moved = infos.iter().find(|info| info.id == tracked_tx).unwrap();
    assert_eq!(moved.category, TransactionCategory::None);
}

#[tokio::test]
async fn moving_transaction_recomputes_both_account_balances() {
    let (ledger, _db) = ledger_with_db().await;
    let first_id = new_account(&ledger, "Checking", true).await;
    let second_id = new_account(&ledger, "Savings", true).await;
    let payee_id = new_payee(&ledger, "Employer").await;
    let salary = ledger.new_category("Salary").await.unwrap();

    let transaction_id = ledger
        .new_transaction(transaction(
            first_id,
            payee_id,
            80_00,
            vec![split(salary, 80_00, 0)],
        ))
        .await
        .unwrap();
    assert_eq!(
        ledger.account_balance(first_id).await.unwrap(),
        MoneyCents::new(80_00)
    );

    ledger
        .update_transaction(
            transaction_id,
            TransactionUpdate {
                account_id: Some(second_id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        ledger.account_balance(first_id).await.unwrap(),
        MoneyCents::ZERO
    );
    assert_eq!(
        ledger.account_balance(second_id).await.unwrap(),
        MoneyCents::new(80_00)
    );
}

#[tokio::test]
async fn account_with_balance_refuses_deletion() {
    let (ledger, _db) = ledger_with_db().await;

    let account_id = ledger
        .new_account(NewAccount {
            name: "Checking".to_string(),
            kind: AccountKind::Checking,
            tracked: true,
            opening_balance: MoneyCents::new(10_00),
        })
        .await
        .unwrap();

    let err = ledger.delete_account(account_id).await.unwrap_err();
    assert_eq!(err, LedgerError::AccountHasBalance);

    // Removing the opening transaction empties the account; deletion
    // then goes through and frees the name.
    let infos = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    ledger.delete_transaction(infos[0].id).await.unwrap();
    ledger.delete_account(account_id).await.unwrap();

    let listed = ledger.list_accounts().await.unwrap();
    assert!(listed.iter().all(|account| account.id != account_id));

    new_account(&ledger, "Checking", true).await;
}

#[tokio::test]
async fn account_names_are_unique_case_insensitively() {
    let (ledger, _db) = ledger_with_db().await;
    new_account(&ledger, "Checking", true).await;

    let err = ledger
        .new_account(NewAccount {
            name: "checking".to_string(),
            kind: AccountKind::Cash,
            tracked: false,
            opening_balance: MoneyCents::ZERO,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateName(_)));
}

#[tokio::test]
async fn move_transactions_to_payee_returns_moved_count() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = new_account(&ledger, "Checking", false).await;
    let old_payee = new_payee(&ledger, "Corner shop").await;
    let new_payee_id = new_payee(&ledger, "Supermarket").await;

    for cents in [-10_00, -20_00] {
        ledger
            .new_transaction(transaction(account_id, old_payee, cents, Vec::new()))
            .await
            .unwrap();
    }

    let moved = ledger
        .move_transactions_to_payee(old_payee, new_payee_id)
        .await
        .unwrap();
    assert_eq!(moved, 2);

    let infos = ledger
        .list_transactions(TransactionFilter::Payee(new_payee_id))
        .await
        .unwrap();
    assert_eq!(infos.len(), 2);
    assert!(infos.iter().all(|info| info.payee == "Supermarket"));

    let infos = ledger
        .list_transactions(TransactionFilter::Payee(old_payee))
        .await
        .unwrap();
    assert!(infos.is_empty());
}

#[tokio::test]
async fn update_replaces_tag_set() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = new_account(&ledger, "Checking", false).await;
    let payee_id = new_payee(&ledger, "Grocer").await;
    let groceries = ledger.new_tag("groceries").await.unwrap();
    let monthly = ledger.new_tag("monthly").await.unwrap();
    let shared = ledger.new_tag("shared").await.unwrap();

    let mut new = transaction(account_id, payee_id, -15_00, Vec::new());
    new.tags = vec![groceries, monthly];
    let transaction_id = ledger.new_transaction(new).await.unwrap();

    ledger
        .update_transaction(
            transaction_id,
            TransactionUpdate {
                tags: Some(vec![monthly, shared]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let infos = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    let names: Vec<&str> = infos[0].tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, ["monthly", "shared"]);
}

#[tokio::test]
async fn budget_month_without_rows_is_empty() {
    let (ledger, _db) = ledger_with_db().await;
    let budget_id = ledger.new_budget("Household").await.unwrap();

    let rows = ledger.budget_month(budget_id, 2026, 3).await.unwrap();
    assert!(rows.is_empty());

    // Out-of-range months read as empty instead of failing.
    let rows = ledger.budget_month(budget_id, 2026, 13).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn budget_month_aggregates_tracked_spending_in_window() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = new_account(&ledger, "Checking", true).await;
    let payee_id = new_payee(&ledger, "Grocer").await;
    let food = ledger.new_category("Food").await.unwrap();
    let fuel = ledger.new_category("Fuel").await.unwrap();
    let budget_id = ledger.new_budget("Household").await.unwrap();

    ledger
        .set_budget_month_category(budget_id, 2026, 3, food, MoneyCents::new(500_00))
        .await
        .unwrap();

    // Two March transactions count, the April one does not.
    for (day, cents) in [(1, -70_00), (31, -50_00)] {
        let mut new = transaction(account_id, payee_id, cents, vec![split(food, cents, 0)]);
        new.posted_on = date(2026, 3, day);
        ledger.new_transaction(new).await.unwrap();
    }
    let mut april = transaction(account_id, payee_id, -99_00, vec![split(food, -99_00, 0)]);
    april.posted_on = date(2026, 4, 1);
    ledger.new_transaction(april).await.unwrap();

    // Spending in a category the month does not budget adds no row.
    let mut other = transaction(account_id, payee_id, -10_00, vec![split(fuel, -10_00, 0)]);
    other.posted_on = date(2026, 3, 10);
    ledger.new_transaction(other).await.unwrap();

    let rows = ledger.budget_month(budget_id, 2026, 3).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category_id, food);
    assert_eq!(rows[0].budgeted, MoneyCents::new(500_00));
    assert_eq!(rows[0].spent, MoneyCents::new(-120_00));
    assert_eq!(rows[0].available, MoneyCents::new(620_00));
}

#[tokio::test]
async fn budgeted_amount_can_be_replaced() {
    let (ledger, _db) = ledger_with_db().await;
    let food = ledger.new_category("Food").await.unwrap();
    let budget_id = ledger.new_budget("Household").await.unwrap();

    let row_id = ledger
        .set_budget_month_category(budget_id, 2026, 3, food, MoneyCents::new(100_00))
        .await
        .unwrap();
    let replaced_id = ledger
        .set_budget_month_category(budget_id, 2026, 3, food, MoneyCents::new(150_00))
        .await
        .unwrap();
    assert_eq!(row_id, replaced_id);

    let rows = ledger.budget_month(budget_id, 2026, 3).await.unwrap();
    assert_eq!(rows[0].budgeted, MoneyCents::new(150_00));
}

#[tokio::test]
async fn seeded_rows_are_present_and_protected() {
    let (ledger, _db) = ledger_with_db().await;

    let starting = ledger.starting_balance_payee().await.unwrap();
    assert_eq!(starting.name, "Starting Balance");

    let categories = ledger.list_categories().await.unwrap();
    let income = categories
        .iter()
        .find(|category| category.name == "Income")
        .unwrap();
    assert!(!income.is_editable);

    let err = ledger
        .rename_category(income.id, "Salary")
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotEditable("Income".to_string()));
}

#[tokio::test]
async fn schedule_slots_are_unique_and_inserts_shift_order() {
    let (ledger, _db) = ledger_with_db().await;

    let err = ledger
        .new_schedule(NewSchedule {
            frequency: ScheduleFrequency::Month,
            interval: 1,
            display_name: "Monthly again".to_string(),
            display_order: 9,
        })
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::DuplicateName("month/1".to_string()));

    ledger
        .new_schedule(NewSchedule {
            frequency: ScheduleFrequency::Week,
            interval: 2,
            display_name: "Biweekly".to_string(),
            display_order: 1,
        })
        .await
        .unwrap();

    let names: Vec<String> = ledger
        .list_schedules()
        .await
        .unwrap()
        .into_iter()
        .map(|schedule| schedule.display_name)
        .collect();
    assert_eq!(names, ["Daily", "Biweekly", "Weekly", "Monthly", "Yearly"]);
}

#[tokio::test]
async fn seeded_schedules_refuse_changes() {
    let (ledger, _db) = ledger_with_db().await;

    let daily = ledger
        .list_schedules()
        .await
        .unwrap()
        .into_iter()
        .find(|schedule| schedule.display_name == "Daily")
        .unwrap();

    let err = ledger.delete_schedule(daily.id).await.unwrap_err();
    assert_eq!(err, LedgerError::NotEditable("Daily".to_string()));

    // Deleting a schedule that never existed is a no-op.
    ledger.delete_schedule(Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn goal_keeps_start_date_only_before_end_date() {
    let (ledger, _db) = ledger_with_db().await;
    let category_id = ledger.new_category("Vacation").await.unwrap();

    let goal_id = ledger
        .new_goal(NewGoal {
            name: "Trip".to_string(),
            description: None,
            category_id,
            amount: Some(MoneyCents::new(1_000_00)),
            start_date: Some(date(2026, 6, 1)),
            end_date: Some(date(2026, 1, 1)),
            schedule_id: None,
        })
        .await
        .unwrap();

    let goal = ledger.goal(goal_id, false).await.unwrap();
    assert_eq!(goal.start_date, None);
    assert_eq!(goal.end_date, Some(date(2026, 1, 1)));

    ledger
        .update_goal(
            goal_id,
            ledger::GoalUpdate {
                name: "Trip".to_string(),
                description: None,
                category_id,
                amount: Some(MoneyCents::new(1_000_00)),
                start_date: Some(date(2026, 1, 1)),
                end_date: Some(date(2026, 6, 1)),
                schedule_id: None,
            },
        )
        .await
        .unwrap();

    let goal = ledger.goal(goal_id, false).await.unwrap();
    assert_eq!(goal.start_date, Some(date(2026, 1, 1)));
}

#[tokio::test]
async fn archived_goals_move_to_the_archive_until_purged() {
    let (ledger, _db) = ledger_with_db().await;
    let category_id = ledger.new_category("Vacation").await.unwrap();

    let goal_id = ledger
        .new_goal(NewGoal {
            name: "Trip".to_string(),
            description: None,
            category_id,
            amount: None,
            start_date: None,
            end_date: None,
            schedule_id: None,
        })
        .await
        .unwrap();

    ledger.archive_goal(goal_id).await.unwrap();
    // Archiving twice stays quiet.
    ledger.archive_goal(goal_id).await.unwrap();

    assert!(ledger.goal(goal_id, false).await.is_err());
    let archived = ledger.list_goals(true).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, goal_id);
    assert!(ledger.list_goals(false).await.unwrap().is_empty());

    ledger.purge_goal(goal_id).await.unwrap();
    assert!(ledger.goal(goal_id, true).await.is_err());
    assert!(ledger.list_goals(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn soft_deleted_category_keeps_historical_names() {
    let (ledger, _db) = ledger_with_db().await;
    let account_id = new_account(&ledger, "Checking", true).await;
    let payee_id = new_payee(&ledger, "Grocer").await;
    let food = ledger.new_category("Food").await.unwrap();

    ledger
        .new_transaction(transaction(
            account_id,
            payee_id,
            -30_00,
            vec![split(food, -30_00, 0)],
        ))
        .await
        .unwrap();

    ledger.delete_category(food).await.unwrap();

    let infos = ledger
        .list_transactions(TransactionFilter::Account(account_id))
        .await
        .unwrap();
    match &infos[0].category {
        TransactionCategory::Single { name, .. } => assert_eq!(name, "Food"),
        other => panic!("expected single category, got {other:?}"),
    }
}
