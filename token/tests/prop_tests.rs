use proptest::prelude::*;

use tally_token::{Account, BlockHeight, Genesis, Token};

const ACCOUNTS: u64 = 8;

#[derive(Clone, Debug)]
enum Op {
    Transfer { from: u64, to: u64, amount: u128 },
    Delegate { from: u64, to: u64, percent: u32 },
    Mine,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..=ACCOUNTS, 0u64..=ACCOUNTS, 0u128..600)
            .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        (1u64..=ACCOUNTS, 0u64..=ACCOUNTS, 0u32..=300)
            .prop_map(|(from, to, percent)| Op::Delegate { from, to, percent }),
        Just(Op::Mine),
    ]
}

fn account(n: u64) -> Account {
    Account::from_low_u64(n)
}

proptest! {
    /// Balances and vote power each sum to the supply at every height, and
    /// delegation bounds hold after every call.
    #[test]
    fn supply_is_conserved(
        supply in 1u128..10_000,
        ops in prop::collection::vec(op(), 1..80),
    ) {
        let mut token = Token::new(&Genesis::new(account(1), supply, BlockHeight::GENESIS)).unwrap();
        let mut height = 0u64;
        for op in ops {
            height += 1;
            let at = BlockHeight::new(height);
            match op {
                Op::Transfer { from, to, amount } => {
                    let _ = token.transfer(&account(from), &account(to), amount, at);
                }
                Op::Delegate { from, to, percent } => {
                    let _ = token.delegate(&account(from), &account(to), percent, at);
                }
                Op::Mine => {}
            }
            for n in 1..=ACCOUNTS {
                prop_assert!(token.delegated_percent(&account(n)) <= 100);
                prop_assert!(token.delegations_of(&account(n)).len() <= 5);
            }
        }

        let now = BlockHeight::new(height);
        for v in 0..=height {
            prop_assert!(token.check_conservation(BlockHeight::new(v), now).is_ok());
        }
    }

    /// Live vote power always matches a from-scratch recomputation.
    #[test]
    fn vote_power_matches_fresh_derivation(
        ops in prop::collection::vec(op(), 1..60),
    ) {
        let mut token = Token::new(&Genesis::new(account(1), 5_000, BlockHeight::GENESIS)).unwrap();
        for (i, op) in ops.into_iter().enumerate() {
            let at = BlockHeight::new(i as u64 + 1);
            match op {
                Op::Transfer { from, to, amount } => {
                    let _ = token.transfer(&account(from), &account(to), amount, at);
                }
                Op::Delegate { from, to, percent } => {
                    let _ = token.delegate(&account(from), &account(to), percent, at);
                }
                Op::Mine => {}
            }
        }
        for n in 0..=ACCOUNTS {
            let a = account(n);
            prop_assert_eq!(token.vote_power_of(&a), token.vote_power_breakdown(&a).total());
        }
    }

    /// A failed call leaves every history untouched.
    #[test]
    fn failed_calls_are_noops(
        setup in prop::collection::vec(op(), 0..30),
        overdraw in 1u128..1_000,
    ) {
        let mut token = Token::new(&Genesis::new(account(1), 1_000, BlockHeight::GENESIS)).unwrap();
        let mut height = 0u64;
        for op in setup {
            height += 1;
            let at = BlockHeight::new(height);
            match op {
                Op::Transfer { from, to, amount } => {
                    let _ = token.transfer(&account(from), &account(to), amount, at);
                }
                Op::Delegate { from, to, percent } => {
                    let _ = token.delegate(&account(from), &account(to), percent, at);
                }
                Op::Mine => {}
            }
        }
        let before = token.clone();
        let at = BlockHeight::new(height + 1);
        let balance = token.balance_of(&account(2));
        prop_assert!(token.transfer(&account(2), &account(3), balance + overdraw, at).is_err());
        prop_assert!(token.delegate(&account(2), &account(2), 1, at).is_err());
        prop_assert!(token.delegate(&account(2), &account(3), 101, at).is_err());

        prop_assert_eq!(token.height(), before.height());
        for n in 0..=ACCOUNTS {
            let a = account(n);
            prop_assert_eq!(token.balance_history(&a), before.balance_history(&a));
            prop_assert_eq!(token.vote_power_history(&a), before.vote_power_history(&a));
            prop_assert_eq!(token.delegations_of(&a), before.delegations_of(&a));
        }
    }
}
