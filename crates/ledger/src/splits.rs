//! Category splits and the pure split calculus.
//!
//! A split assigns a slice of a transaction's amount to one category.
//! Splits are ordered by `position`, which is zero-based and contiguous
//! per transaction. Two pure functions police and evolve them:
//!
//! - [`validate_splits`] checks a desired split set against the
//!   transaction amount before any write begins;
//! - [`reconcile_splits`] diffs the persisted rows against a desired set
//!   and returns the minimal [`SplitChangeSet`] to apply.
//!
//! Both are deterministic and side-effect free; the orchestrator applies
//! the change-set inside the same database transaction as the owning
//! transaction row.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{LedgerError, MoneyCents, ResultLedger};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub notes: Option<String>,
    pub position: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Categories,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A desired split as submitted by a caller, before it has a row id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitDraft {
    pub category_id: Uuid,
    pub amount: MoneyCents,
    pub notes: Option<String>,
    pub position: i32,
}

/// A partial update against one persisted split.
///
/// `None` means "leave the column alone"; for `notes`, `Some(None)`
/// clears it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitUpdate {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Option<MoneyCents>,
    pub notes: Option<Option<String>>,
}

/// The outcome of reconciling persisted splits against a desired set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitChangeSet {
    pub added: Vec<SplitDraft>,
    pub removed: Vec<Uuid>,
    pub updated: Vec<SplitUpdate>,
}

impl SplitChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Checks a desired split set against the owning transaction's amount.
///
/// Two invariants, checked in order:
/// - the split amounts sum exactly to `transaction_amount` (fixed-point
///   equality, no tolerance), else [`LedgerError::InvalidSplitTotal`];
/// - the `position` values are a permutation of `0..n` (no gap, no
///   duplicate), else [`LedgerError::InvalidSplitOrder`].
///
/// An empty set passes only when the transaction amount is zero. Callers
/// skip this entirely for untracked accounts, which carry no splits.
pub fn validate_splits(splits: &[SplitDraft], transaction_amount: MoneyCents) -> ResultLedger<()> {
    let total = MoneyCents::checked_sum(splits.iter().map(|split| split.amount))
        .ok_or_else(|| LedgerError::InvalidAmount("split amounts overflow".to_string()))?;
    if total != transaction_amount {
        return Err(LedgerError::InvalidSplitTotal);
    }

    let mut seen = vec![false; splits.len()];
    for split in splits {
        let index = usize::try_from(split.position).map_err(|_| LedgerError::InvalidSplitOrder)?;
        if index >= seen.len() || seen[index] {
            return Err(LedgerError::InvalidSplitOrder);
        }
        seen[index] = true;
    }

    Ok(())
}

/// Diffs persisted splits against a desired set, positionally.
///
/// Both sides are sorted by `position` and walked in lock-step. A pair
/// differing in category, amount or notes yields one [`SplitUpdate`]
/// carrying only the changed columns; surplus persisted rows land in
/// `removed`, surplus desired drafts in `added`. Identity is positional:
/// swapping two otherwise-identical rows comes out as two field updates,
/// not a reorder.
pub fn reconcile_splits(existing: &[Model], desired: &[SplitDraft]) -> SplitChangeSet {
    if existing.is_empty() {
        return SplitChangeSet {
            added: desired.to_vec(),
            ..Default::default()
        };
    }
    if desired.is_empty() {
        return SplitChangeSet {
            removed: existing.iter().map(|row| row.id).collect(),
            ..Default::default()
        };
    }

    let mut existing: Vec<&Model> = existing.iter().collect();
    existing.sort_by_key(|row| row.position);
    let mut desired: Vec<&SplitDraft> = desired.iter().collect();
    desired.sort_by_key(|draft| draft.position);

    let mut change_set = SplitChangeSet::default();
    let paired = existing.len().min(desired.len());

    for (row, want) in existing.iter().zip(desired.iter()).take(paired) {
        let category_changed = row.category_id != want.category_id;
        let amount_changed = row.amount_minor != want.amount.cents();
        let notes_changed = row.notes != want.notes;
        if category_changed || amount_changed || notes_changed {
            change_set.updated.push(SplitUpdate {
                id: row.id,
                category_id: category_changed.then_some(want.category_id),
                amount: amount_changed.then_some(want.amount),
                notes: notes_changed.then(|| want.notes.clone()),
            });
        }
    }

    change_set
        .removed
        .extend(existing.iter().skip(paired).map(|row| row.id));
    change_set
        .added
        .extend(desired.iter().skip(paired).map(|draft| (*draft).clone()));

    change_set
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn draft(category_id: Uuid, amount: i64, position: i32) -> SplitDraft {
        SplitDraft {
            category_id,
            amount: MoneyCents::new(amount),
            notes: None,
            position,
        }
    }

    fn row(category_id: Uuid, amount: i64, position: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4(),
            category_id,
            amount_minor: amount,
            notes: None,
            position,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn validate_accepts_exact_total_and_contiguous_positions() {
        let groceries = Uuid::new_v4();
        let fuel = Uuid::new_v4();
        let splits = vec![draft(fuel, 4_000, 1), draft(groceries, 6_000, 0)];

        assert_eq!(validate_splits(&splits, MoneyCents::new(10_000)), Ok(()));
    }

    #[test]
    fn validate_rejects_total_mismatch() {
        let splits = vec![
            draft(Uuid::new_v4(), 6_000, 0),
            draft(Uuid::new_v4(), 4_001, 1),
        ];

        assert_eq!(
            validate_splits(&splits, MoneyCents::new(10_000)),
            Err(LedgerError::InvalidSplitTotal)
        );
    }

    #[test]
    fn validate_rejects_position_gap() {
        let splits = vec![
            draft(Uuid::new_v4(), 6_000, 0),
            draft(Uuid::new_v4(), 4_000, 2),
        ];

        assert_eq!(
            validate_splits(&splits, MoneyCents::new(10_000)),
            Err(LedgerError::InvalidSplitOrder)
        );
    }

    #[test]
    fn validate_rejects_duplicate_position() {
        let splits = vec![
            draft(Uuid::new_v4(), 6_000, 1),
            draft(Uuid::new_v4(), 4_000, 1),
        ];

        assert_eq!(
            validate_splits(&splits, MoneyCents::new(10_000)),
            Err(LedgerError::InvalidSplitOrder)
        );
    }

    #[test]
    fn validate_rejects_negative_position() {
        let splits = vec![draft(Uuid::new_v4(), 10_000, -1)];

        assert_eq!(
            validate_splits(&splits, MoneyCents::new(10_000)),
            Err(LedgerError::InvalidSplitOrder)
        );
    }

    #[test]
    fn validate_single_split_must_match_total() {
        let splits = vec![draft(Uuid::new_v4(), 9_999, 0)];

        assert_eq!(
            validate_splits(&splits, MoneyCents::new(10_000)),
            Err(LedgerError::InvalidSplitTotal)
        );
        assert_eq!(validate_splits(&splits, MoneyCents::new(9_999)), Ok(()));
    }

    #[test]
    fn validate_empty_set_passes_only_at_zero() {
        assert_eq!(validate_splits(&[], MoneyCents::ZERO), Ok(()));
        assert_eq!(
            validate_splits(&[], MoneyCents::new(1)),
            Err(LedgerError::InvalidSplitTotal)
        );
    }

    #[test]
    fn reconcile_identical_sets_changes_nothing() {
        let category = Uuid::new_v4();
        let existing = vec![row(category, 10_000, 0)];
        let desired = vec![draft(category, 10_000, 0)];

        assert!(reconcile_splits(&existing, &desired).is_empty());
    }

    #[test]
    fn reconcile_empty_existing_adds_everything() {
        let desired = vec![
            draft(Uuid::new_v4(), 6_000, 0),
            draft(Uuid::new_v4(), 4_000, 1),
        ];

        let change_set = reconcile_splits(&[], &desired);
        assert_eq!(change_set.added, desired);
        assert!(change_set.removed.is_empty());
        assert!(change_set.updated.is_empty());
    }

    #[test]
    fn reconcile_empty_desired_removes_everything() {
        let existing = vec![row(Uuid::new_v4(), 6_000, 0), row(Uuid::new_v4(), 4_000, 1)];

        let change_set = reconcile_splits(&existing, &[]);
        assert_eq!(change_set.removed, vec![existing[0].id, existing[1].id]);
        assert!(change_set.added.is_empty());
        assert!(change_set.updated.is_empty());
    }

    #[test]
    fn reconcile_category_change_yields_one_partial_update() {
        let groceries = Uuid::new_v4();
        let fuel = Uuid::new_v4();
        let household = Uuid::new_v4();
        let existing = vec![row(groceries, 6_000, 0), row(fuel, 4_000, 1)];
        let desired = vec![draft(groceries, 6_000, 0), draft(household, 4_000, 1)];

        let change_set = reconcile_splits(&existing, &desired);
        assert!(change_set.added.is_empty());
        assert!(change_set.removed.is_empty());
        assert_eq!(
            change_set.updated,
            vec![SplitUpdate {
                id: existing[1].id,
                category_id: Some(household),
                amount: None,
                notes: None,
            }]
        );
    }

    #[test]
    fn reconcile_amount_and_notes_change_in_one_update() {
        let category = Uuid::new_v4();
        let existing = vec![row(category, 6_000, 0)];
        let mut wanted = draft(category, 7_500, 0);
        wanted.notes = Some("rebooked".to_string());

        let change_set = reconcile_splits(&existing, &[wanted.clone()]);
        assert_eq!(
            change_set.updated,
            vec![SplitUpdate {
                id: existing[0].id,
                category_id: None,
                amount: Some(MoneyCents::new(7_500)),
                notes: Some(Some("rebooked".to_string())),
            }]
        );
    }

    #[test]
    fn reconcile_update_can_clear_notes() {
        let category = Uuid::new_v4();
        let mut kept = row(category, 6_000, 0);
        kept.notes = Some("old".to_string());

        let change_set = reconcile_splits(&[kept.clone()], &[draft(category, 6_000, 0)]);
        assert_eq!(
            change_set.updated,
            vec![SplitUpdate {
                id: kept.id,
                category_id: None,
                amount: None,
                notes: Some(None),
            }]
        );
    }

    #[test]
    fn reconcile_surplus_on_both_sides() {
        let groceries = Uuid::new_v4();
        let fuel = Uuid::new_v4();
        let household = Uuid::new_v4();
        let existing = vec![
            row(groceries, 5_000, 0),
            row(fuel, 3_000, 1),
            row(household, 2_000, 2),
        ];
        let desired = vec![draft(groceries, 5_000, 0), draft(fuel, 5_000, 1)];

        let change_set = reconcile_splits(&existing, &desired);
        assert_eq!(change_set.removed, vec![existing[2].id]);
        assert_eq!(
            change_set.updated,
            vec![SplitUpdate {
                id: existing[1].id,
                category_id: None,
                amount: Some(MoneyCents::new(5_000)),
                notes: None,
            }]
        );
        assert!(change_set.added.is_empty());
    }

    #[test]
    fn reconcile_swapped_rows_become_two_updates() {
        let groceries = Uuid::new_v4();
        let fuel = Uuid::new_v4();
        let existing = vec![row(groceries, 6_000, 0), row(fuel, 4_000, 1)];
        let desired = vec![draft(fuel, 4_000, 0), draft(groceries, 6_000, 1)];

        let change_set = reconcile_splits(&existing, &desired);
        assert_eq!(change_set.updated.len(), 2);
        assert!(change_set.added.is_empty());
        assert!(change_set.removed.is_empty());
    }

    #[test]
    fn reconcile_ignores_input_order() {
        let groceries = Uuid::new_v4();
        let fuel = Uuid::new_v4();
        let existing = vec![row(fuel, 4_000, 1), row(groceries, 6_000, 0)];
        let desired = vec![draft(fuel, 4_000, 1), draft(groceries, 6_000, 0)];

        assert!(reconcile_splits(&existing, &desired).is_empty());
    }

    #[test]
    fn reconcile_applied_change_set_reaches_fixpoint() {
        let groceries = Uuid::new_v4();
        let household = Uuid::new_v4();
        let existing = vec![row(groceries, 6_000, 0), row(groceries, 4_000, 1)];
        let desired = vec![draft(groceries, 7_000, 0), draft(household, 3_000, 1)];

        let change_set = reconcile_splits(&existing, &desired);

        // Apply the change-set by hand, then reconcile again.
        let mut applied = existing.clone();
        for update in &change_set.updated {
            let target = applied
                .iter_mut()
                .find(|row| row.id == update.id)
                .unwrap();
            if let Some(category_id) = update.category_id {
                target.category_id = category_id;
            }
            if let Some(amount) = update.amount {
                target.amount_minor = amount.cents();
            }
            if let Some(notes) = &update.notes {
                target.notes = notes.clone();
            }
        }
        applied.retain(|row| !change_set.removed.contains(&row.id));
        for added in &change_set.added {
            let mut new_row = row(added.category_id, added.amount.cents(), added.position);
            new_row.notes = added.notes.clone();
            applied.push(new_row);
        }

        assert!(reconcile_splits(&applied, &desired).is_empty());
    }
}
