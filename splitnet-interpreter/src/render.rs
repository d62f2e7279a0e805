use std::fmt::Write;

use rust_decimal::Decimal;
use splitnet_application::{GroupSettlement, MemberDirectory};
use splitnet_domain::{MemberId, Money};

/// Formats an amount of minor units with `scale` decimal places.
pub fn format_money(amount: Money, scale: u32) -> String {
    Decimal::new(amount.amount(), scale).to_string()
}

fn member_label(directory: &dyn MemberDirectory, member: MemberId) -> String {
    directory
        .display_name(member)
        .map_or_else(|| format!("#{member}"), str::to_owned)
}

pub fn render_settlement(
    result: &GroupSettlement,
    directory: &dyn MemberDirectory,
    scale: u32,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Balances:");
    for (&member, &balance) in &result.balances {
        let _ = writeln!(
            out,
            "  {}: {}",
            member_label(directory, member),
            format_money(balance, scale)
        );
    }

    if result.settlements.is_empty() {
        let _ = writeln!(out, "Settlements: none");
    } else {
        let _ = writeln!(out, "Settlements:");
        for settlement in &result.settlements {
            let _ = writeln!(
                out,
                "  {} -> {}: {}",
                member_label(directory, settlement.from),
                member_label(directory, settlement.to),
                format_money(settlement.amount, scale)
            );
        }
    }

    if !result.is_fully_settled() {
        let _ = writeln!(out, "Left below minimum transfer:");
        for (&member, &balance) in result.residual.iter().filter(|(_, b)| !b.is_zero()) {
            let _ = writeln!(
                out,
                "  {}: {}",
                member_label(directory, member),
                format_money(balance, scale)
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use splitnet_domain::{MemberBalances, Settlement};
    use std::collections::HashMap;

    #[rstest]
    #[case::cents(9000, 2, "90.00")]
    #[case::negative_cents(-305, 2, "-3.05")]
    #[case::whole_units(1250, 0, "1250")]
    #[case::sub_unit(7, 3, "0.007")]
    fn formats_minor_units(#[case] amount: i64, #[case] scale: u32, #[case] expected: &str) {
        assert_eq!(format_money(Money::from_i64(amount), scale), expected);
    }

    #[test]
    fn renders_names_and_falls_back_to_ids() {
        let directory: HashMap<MemberId, String> =
            HashMap::from([(MemberId(1), "Alice".to_string())]);
        let balances = MemberBalances::from_iter([
            (MemberId(1), Money::from_i64(1500)),
            (MemberId(2), Money::from_i64(-1500)),
        ]);
        let result = GroupSettlement {
            residual: MemberBalances::from_iter([
                (MemberId(1), Money::ZERO),
                (MemberId(2), Money::ZERO),
            ]),
            balances,
            settlements: vec![Settlement {
                from: MemberId(2),
                to: MemberId(1),
                amount: Money::from_i64(1500),
            }],
        };

        assert_eq!(
            render_settlement(&result, &directory, 2),
            "Balances:\n  Alice: 15.00\n  #2: -15.00\nSettlements:\n  #2 -> Alice: 15.00\n"
        );
    }
}
