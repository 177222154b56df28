// ⚖️ Settlement Engine - who pays whom, in as few transfers as possible
//
// The split is equal: every participant with a non-blank name owes
// total / count (floor division). Blank-named people are ghosts - their
// items count for nothing and they are not part of the divisor.
//
// Fair share uses floor division, so splitting 100 cents three ways gives
// everyone a share of 33 and the leftover cent lands in nobody's balance.
// That remainder is absorbed, not distributed - a documented
// simplification.
//
// Matching is greedy largest-debtor against largest-creditor. This
// minimizes transfer count in common cases but is not guaranteed optimal
// for every distribution - also a documented simplification; do not
// replace it with an exact algorithm without treating that as a behavior
// change.

use serde::{Deserialize, Serialize};

use crate::state::Person;

// ============================================================================
// SETTLEMENT (derived value - recomputed on demand, never persisted alone)
// ============================================================================

/// One debtor→creditor transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: String,
    pub to: String,

    /// Always positive - zero-amount transfers are never recorded.
    #[serde(rename = "amountCents")]
    pub amount_cents: i64,
}

/// A participant's net position after the split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub name: String,

    /// paid total − fair share. Positive = creditor, negative = debtor.
    #[serde(rename = "balanceCents")]
    pub balance_cents: i64,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Compute each named participant's balance.
///
/// With fewer than two named participants every balance is zero by
/// construction of the empty settlement, but balances are still reported
/// for display.
pub fn compute_balances(people: &[Person]) -> Vec<Balance> {
    let participants: Vec<&Person> = people.iter().filter(|p| p.has_name()).collect();
    if participants.is_empty() {
        return Vec::new();
    }

    let total: i64 = participants.iter().map(|p| p.paid_total()).sum();
    let fair_share = total / participants.len() as i64; // floor; remainder absorbed

    participants
        .iter()
        .map(|p| Balance {
            name: p.name.clone(),
            balance_cents: p.paid_total() - fair_share,
        })
        .collect()
}

/// Compute the minimal transfer list settling all balances.
///
/// Example:
/// ```
/// use tab_split::{compute_settlements, Person, LineItem};
///
/// let mut a = Person::named("A");
/// a.items.push(LineItem::new("hotel", 5000));
/// let b = Person::named("B");
///
/// let transfers = compute_settlements(&[a, b]);
/// assert_eq!(transfers.len(), 1);
/// assert_eq!(transfers[0].amount_cents, 2500);
/// ```
pub fn compute_settlements(people: &[Person]) -> Vec<Settlement> {
    let balances = compute_balances(people);

    // Nothing to settle with fewer than two participants
    if balances.len() < 2 {
        return Vec::new();
    }

    // Split into debtors (owe money) and creditors (owed money),
    // each sorted descending by magnitude
    let mut debtors: Vec<(String, i64)> = balances
        .iter()
        .filter(|b| b.balance_cents < 0)
        .map(|b| (b.name.clone(), -b.balance_cents))
        .collect();
    let mut creditors: Vec<(String, i64)> = balances
        .iter()
        .filter(|b| b.balance_cents > 0)
        .map(|b| (b.name.clone(), b.balance_cents))
        .collect();

    debtors.sort_by(|a, b| b.1.cmp(&a.1));
    creditors.sort_by(|a, b| b.1.cmp(&a.1));

    // Greedy match: largest remaining debtor pays largest remaining
    // creditor, advance past anyone who reaches exactly zero
    let mut settlements = Vec::new();
    let mut di = 0;
    let mut ci = 0;

    while di < debtors.len() && ci < creditors.len() {
        let amount = debtors[di].1.min(creditors[ci].1);

        if amount > 0 {
            settlements.push(Settlement {
                from: debtors[di].0.clone(),
                to: creditors[ci].0.clone(),
                amount_cents: amount,
            });
        }

        debtors[di].1 -= amount;
        creditors[ci].1 -= amount;

        if debtors[di].1 == 0 {
            di += 1;
        }
        if creditors[ci].1 == 0 {
            ci += 1;
        }
    }

    settlements
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LineItem;

    fn person_with(name: &str, amounts: &[i64]) -> Person {
        let mut person = Person::named(name);
        for (idx, &cents) in amounts.iter().enumerate() {
            person.items.push(LineItem::new(&format!("item {}", idx), cents));
        }
        person
    }

    #[test]
    fn test_three_way_split_scenario() {
        // A paid 5000, B paid 1500, C paid 0. Total 6500,
        // fair share floor(6500/3) = 2166.
        // Balances: A = +2834, B = -666, C = -2166.
        let people = vec![
            person_with("A", &[5000]),
            person_with("B", &[1500]),
            person_with("C", &[]),
        ];

        let balances = compute_balances(&people);
        assert_eq!(balances[0].balance_cents, 2834);
        assert_eq!(balances[1].balance_cents, -666);
        assert_eq!(balances[2].balance_cents, -2166);

        let settlements = compute_settlements(&people);

        // Everything flows to A
        assert!(settlements.iter().all(|s| s.to == "A"));

        // Total transferred is exactly the debtors' combined debt
        let transferred: i64 = settlements.iter().map(|s| s.amount_cents).sum();
        assert_eq!(transferred, 2832); // 666 + 2166

        // Largest debtor first: C pays before B
        assert_eq!(settlements[0].from, "C");
        assert_eq!(settlements[0].amount_cents, 2166);
        assert_eq!(settlements[1].from, "B");
        assert_eq!(settlements[1].amount_cents, 666);

        assert!(settlements.len() <= 2);
        println!("✅ Three-way split test passed: {} transfers", settlements.len());
    }

    #[test]
    fn test_fewer_than_two_participants_settles_nothing() {
        assert!(compute_settlements(&[]).is_empty());

        let one = vec![person_with("Solo", &[123456])];
        assert!(compute_settlements(&one).is_empty());

        // A named person plus a blank one is still just one participant
        let with_ghost = vec![person_with("Solo", &[9900]), person_with("", &[5000])];
        assert!(compute_settlements(&with_ghost).is_empty());
    }

    #[test]
    fn test_blank_names_excluded_from_pool_and_divisor() {
        // The blank person's 9000 cents must not enter the total, and
        // they must not count toward the divisor.
        let people = vec![
            person_with("A", &[3000]),
            person_with("B", &[0]),
            person_with("   ", &[9000]),
        ];

        let balances = compute_balances(&people);
        assert_eq!(balances.len(), 2);
        // total 3000, share 1500
        assert_eq!(balances[0].balance_cents, 1500);
        assert_eq!(balances[1].balance_cents, -1500);

        let settlements = compute_settlements(&people);
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].from, "B");
        assert_eq!(settlements[0].to, "A");
        assert_eq!(settlements[0].amount_cents, 1500);

        println!("✅ Blank-name exclusion test passed");
    }

    #[test]
    fn test_even_split_no_transfers() {
        let people = vec![person_with("A", &[2000]), person_with("B", &[2000])];
        assert!(compute_settlements(&people).is_empty());
    }

    #[test]
    fn test_floor_division_absorbs_remainder() {
        // 100 cents across three people: share is 33, one cent vanishes
        let people = vec![
            person_with("A", &[100]),
            person_with("B", &[]),
            person_with("C", &[]),
        ];

        let balances = compute_balances(&people);
        assert_eq!(balances[0].balance_cents, 67);
        assert_eq!(balances[1].balance_cents, -33);
        assert_eq!(balances[2].balance_cents, -33);

        // Net across balances is the absorbed remainder, not zero
        let net: i64 = balances.iter().map(|b| b.balance_cents).sum();
        assert_eq!(net, 1);

        let transferred: i64 = compute_settlements(&people)
            .iter()
            .map(|s| s.amount_cents)
            .sum();
        assert_eq!(transferred, 66);
    }

    #[test]
    fn test_multiple_items_summed_per_person() {
        let people = vec![
            person_with("A", &[1000, 2000, 500]),
            person_with("B", &[500]),
        ];

        // total 4000, share 2000; B owes A 1500
        let settlements = compute_settlements(&people);
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].amount_cents, 1500);
    }

    #[test]
    fn test_reproducible_for_identical_input() {
        let people = vec![
            person_with("A", &[7700]),
            person_with("B", &[3100]),
            person_with("C", &[0]),
            person_with("D", &[1200]),
        ];

        let first = compute_settlements(&people);
        let second = compute_settlements(&people);
        assert_eq!(first, second);
    }

    #[test]
    fn test_larger_group_nets_to_zero_after_settling() {
        let people = vec![
            person_with("A", &[10000]),
            person_with("B", &[6000]),
            person_with("C", &[2000]),
            person_with("D", &[0]),
        ];
        // total 18000, share 4500
        // A +5500, B +1500, C -2500, D -4500

        let mut remaining: std::collections::HashMap<String, i64> = compute_balances(&people)
            .into_iter()
            .map(|b| (b.name, b.balance_cents))
            .collect();

        for s in compute_settlements(&people) {
            assert!(s.amount_cents > 0);
            *remaining.get_mut(&s.from).unwrap() += s.amount_cents;
            *remaining.get_mut(&s.to).unwrap() -= s.amount_cents;
        }

        assert!(remaining.values().all(|&v| v == 0));
        println!("✅ Group settlement nets to zero");
    }
}
