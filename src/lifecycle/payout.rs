use chrono::{DateTime, Utc};

use crate::error::{AppResult, PreconditionError};
use crate::ledger::models::{ContestResults, EntryResult, EntryStanding, BASIS_POINTS_TOTAL};

/// Rank standings and assign payout basis points by finishing position.
///
/// Lower score finishes higher. Entrants tied on score share the summed bps of
/// the positions they occupy; the integer remainder goes to the tied entrant with
/// the lowest entry id. The payout vector is validated, never normalized.
pub fn compute_results(
    standings: &[EntryStanding],
    payout_structure: &[u32],
    settled_at: DateTime<Utc>,
) -> AppResult<ContestResults> {
    validate_payout(payout_structure)?;

    let mut ranked: Vec<&EntryStanding> = standings.iter().collect();
    ranked.sort_by_key(|s| (s.score, s.entry_id));

    let mut entries = Vec::with_capacity(ranked.len());
    let mut start = 0;

    for group in ranked.chunk_by(|a, b| a.score == b.score) {
        let end = start + group.len();
        // bounded by the structure total validated above
        let pool: u64 = payout_structure
            .iter()
            .skip(start)
            .take(group.len())
            .map(|bps| u64::from(*bps))
            .sum();
        let share = (pool / group.len() as u64) as u32;
        let remainder = (pool % group.len() as u64) as u32;

        for (i, standing) in group.iter().enumerate() {
            entries.push(EntryResult {
                entry_id: standing.entry_id,
                entrant: standing.entrant.clone(),
                score: standing.score,
                position: start as u32 + 1,
                payout_bps: if i == 0 { share + remainder } else { share },
            });
        }

        start = end;
    }

    let (winning_entries, payout_bps): (Vec<u64>, Vec<u32>) = entries
        .iter()
        .filter(|e| e.payout_bps > 0)
        .map(|e| (e.entry_id, e.payout_bps))
        .unzip();

    validate_payout(&payout_bps)?;

    Ok(ContestResults {
        winning_entries,
        payout_bps,
        entries,
        settled_at,
    })
}

/// Payout basis points must sum to exactly 10000
pub fn validate_payout(payout_bps: &[u32]) -> AppResult<()> {
    let sum: u64 = payout_bps.iter().map(|bps| u64::from(*bps)).sum();
    if sum != u64::from(BASIS_POINTS_TOTAL) {
        return Err(PreconditionError::PayoutSkew { sum }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn standing(entry_id: u64, score: i32) -> EntryStanding {
        EntryStanding {
            entry_id,
            entrant: format!("0x{:040x}", entry_id),
            score,
        }
    }

    #[test]
    fn test_lowest_score_wins_everything() {
        let results = compute_results(
            &[standing(1, -4), standing(2, -11), standing(3, 2)],
            &[10_000],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(results.winning_entries, vec![2]);
        assert_eq!(results.payout_bps, vec![10_000]);
        assert_eq!(results.entries[0].position, 1);
        assert_eq!(results.entries[2].entry_id, 3);
        assert_eq!(results.entries[2].position, 3);
    }

    #[test]
    fn test_ties_split_positions_with_remainder_to_lowest_id() {
        // two entrants tied for first share 1st + 2nd, third place keeps its share
        let results = compute_results(
            &[standing(7, -10), standing(4, -10), standing(9, -3), standing(5, 1)],
            &[6_001, 3_000, 999],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(results.winning_entries, vec![4, 7, 9]);
        assert_eq!(results.payout_bps, vec![4_501, 4_500, 999]);
        assert_eq!(results.entries[1].position, 1);
        assert_eq!(results.entries[2].position, 3);
        assert_eq!(results.entries[3].payout_bps, 0);
    }

    #[test]
    fn test_unfilled_positions_are_a_skew() {
        let err = compute_results(&[standing(1, 0)], &[7_000, 3_000], Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Precondition(PreconditionError::PayoutSkew { sum: 7_000 })
        ));
    }

    #[test]
    fn test_no_entries_cannot_settle() {
        assert!(compute_results(&[], &[10_000], Utc::now()).is_err());
    }

    #[test]
    fn test_oversized_structure_is_rejected_before_ranking() {
        // u32::MAX + 10_001 wraps to exactly 10_000 in u32 arithmetic
        let err = compute_results(
            &[standing(1, -5), standing(2, -5)],
            &[u32::MAX, 10_001],
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::Precondition(PreconditionError::PayoutSkew { sum }) if sum == u64::from(u32::MAX) + 10_001
        ));
    }

    #[test]
    fn test_validate_payout() {
        assert!(validate_payout(&[5_000, 3_000, 2_000]).is_ok());
        assert!(validate_payout(&[5_000, 3_000, 2_001]).is_err());
        assert!(validate_payout(&[u32::MAX, 10_001]).is_err());
    }
}
