use proptest::prelude::*;

use tally_types::{Account, BlockHeight, Checkpoint};

proptest! {
    /// Account textual form parses back to the same account.
    #[test]
    fn account_text_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let account = Account::new(bytes);
        let parsed = Account::from_hex(&account.to_string()).unwrap();
        prop_assert_eq!(parsed, account);
    }

    /// Account::is_zero is true only for all-zero bytes.
    #[test]
    fn account_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        let account = Account::new(bytes);
        prop_assert_eq!(account.is_zero(), bytes == [0u8; 20]);
    }

    /// Account ordering follows byte ordering, so sorted account sets are stable.
    #[test]
    fn account_ordering_matches_bytes(
        a in prop::array::uniform20(0u8..),
        b in prop::array::uniform20(0u8..),
    ) {
        prop_assert_eq!(Account::new(a) <= Account::new(b), a <= b);
    }

    /// BlockHeight ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn height_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ha = BlockHeight::new(a);
        let hb = BlockHeight::new(b);
        prop_assert_eq!(ha <= hb, a <= b);
        prop_assert_eq!(ha == hb, a == b);
    }

    /// Checkpoint bincode serialization roundtrip.
    #[test]
    fn checkpoint_bincode_roundtrip(height in 0u64..u64::MAX, value in 0u128..u128::MAX) {
        let cp = Checkpoint::new(BlockHeight::new(height), value);
        let encoded = bincode::serialize(&cp).unwrap();
        let decoded: Checkpoint = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, cp);
    }
}
