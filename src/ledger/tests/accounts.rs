//! Unit tests for the ledger: balances, overdraft guard, history.

use crate::ledger::{AccountId, Ledger, LedgerError};

fn setup_ledger() -> Ledger {
    Ledger::new()
}

#[test]
fn test_balance_creates_account_on_first_access() {
    let ledger = setup_ledger();
    assert_eq!(ledger.balance(AccountId(1)), 0);
    // The account now exists and stays at zero.
    assert_eq!(ledger.balance(AccountId(1)), 0);
}

#[test]
fn test_apply_delta_credits_and_debits() {
    let ledger = setup_ledger();
    let account = AccountId(7);

    assert_eq!(ledger.apply_delta(account, 500, "seed"), Ok(500));
    assert_eq!(ledger.apply_delta(account, -200, "spend"), Ok(300));
    assert_eq!(ledger.balance(account), 300);
}

#[test]
fn test_apply_delta_rejects_overdraft_without_mutation() {
    let ledger = setup_ledger();
    let account = AccountId(7);
    ledger.apply_delta(account, 100, "seed").unwrap();

    let result = ledger.apply_delta(account, -101, "overspend");
    assert_eq!(
        result,
        Err(LedgerError::InsufficientFunds {
            account,
            delta: -101,
            balance: 100,
        })
    );

    // No balance change and no history entry for the rejected delta.
    assert_eq!(ledger.balance(account), 100);
    assert_eq!(ledger.history(account, 10).len(), 1);
}

#[test]
fn test_history_is_most_recent_first_and_limited() {
    let ledger = setup_ledger();
    let account = AccountId(3);

    for i in 1..=5 {
        ledger.apply_delta(account, i, format!("step {}", i)).unwrap();
    }

    let history = ledger.history(account, 3);
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].delta, 5);
    assert_eq!(history[1].delta, 4);
    assert_eq!(history[2].delta, 3);
    assert_eq!(history[0].balance_after, 15);
}

#[test]
fn test_history_of_unknown_account_is_empty() {
    let ledger = setup_ledger();
    assert!(ledger.history(AccountId(99), 10).is_empty());
}

#[test]
fn test_top_balances_ranks_descending_and_skips_zero() {
    let ledger = setup_ledger();
    ledger.apply_delta(AccountId(1), 100, "seed").unwrap();
    ledger.apply_delta(AccountId(2), 300, "seed").unwrap();
    ledger.apply_delta(AccountId(3), 200, "seed").unwrap();
    ledger.balance(AccountId(4)); // exists with zero balance

    let top = ledger.top_balances(10);
    assert_eq!(
        top,
        vec![
            (AccountId(2), 300),
            (AccountId(3), 200),
            (AccountId(1), 100)
        ]
    );

    assert_eq!(ledger.top_balances(2).len(), 2);
}

#[test]
fn test_total_coins_sums_all_accounts() {
    let ledger = setup_ledger();
    ledger.apply_delta(AccountId(1), 100, "seed").unwrap();
    ledger.apply_delta(AccountId(2), 250, "seed").unwrap();
    assert_eq!(ledger.total_coins(), 350);
}

#[test]
fn test_randomized_delta_sequence_never_goes_negative() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let ledger = setup_ledger();
    let account = AccountId(42);
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..1000 {
        let delta = rng.random_range(-500..500);
        let _ = ledger.apply_delta(account, delta, "fuzz");
        assert!(ledger.balance(account) >= 0);
    }

    // Every accepted delta is mirrored in history.
    let replayed: i64 = ledger
        .history(account, usize::MAX)
        .iter()
        .map(|entry| entry.delta)
        .sum();
    assert_eq!(replayed, ledger.balance(account));
}
