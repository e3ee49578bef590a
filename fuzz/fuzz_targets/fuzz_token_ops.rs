#![no_main]

use libfuzzer_sys::fuzz_target;

use tally_token::{Account, BlockHeight, Genesis, Token};

// Drive a token with arbitrary transfer/delegate sequences over a small set of
// accounts. No call may panic, and balances and vote power must each sum to
// the supply at every height afterwards.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let supply = u64::from_le_bytes([
        data[0], data[1], data[2], data[3],
        data[4], data[5], data[6], data[7],
    ]) as u128;

    let account = |b: u8| Account::from_low_u64(u64::from(b % 8));
    let owner = Account::from_low_u64(1);
    let mut token = match Token::new(&Genesis::new(owner, supply, BlockHeight::GENESIS)) {
        Ok(token) => token,
        Err(_) => return,
    };

    let ops = &data[8..];
    let mut height = 0u64;
    let mut offset = 0;
    while offset + 12 <= ops.len() {
        let op = &ops[offset..offset + 12];
        height += u64::from(op[1] % 3);
        let at = BlockHeight::new(height);

        if op[0] % 2 == 0 {
            let amount = u64::from_le_bytes([
                op[4], op[5], op[6], op[7],
                op[8], op[9], op[10], op[11],
            ]) as u128;
            let _ = token.transfer(&account(op[2]), &account(op[3]), amount % (supply + 1), at);
        } else {
            let percent = u32::from_le_bytes([op[4], op[5], op[6], op[7]]) % 300;
            let _ = token.delegate(&account(op[2]), &account(op[3]), percent, at);
        }

        offset += 12;
    }

    let now = BlockHeight::new(height);
    for v in 0..=height {
        if let Err(e) = token.check_conservation(BlockHeight::new(v), now) {
            panic!("{e}");
        }
    }
});
