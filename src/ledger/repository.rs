use super::models::*;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;

/// Contest ledger - the off-chain mirror of contract state.
///
/// `record_transition` is the only write, and callers invoke it only after a
/// transaction has been confirmed on chain.
#[async_trait]
pub trait ContestLedger: Send + Sync {
    async fn find_contest(&self, contest_id: &str) -> AppResult<Option<Contest>>;

    async fn find_eligible_contests(&self, filter: &EligibilityFilter) -> AppResult<Vec<Contest>>;

    /// Persist a confirmed status (and results on settlement) in one update
    async fn record_transition(&self, contest_id: &str, update: &ContestUpdate) -> AppResult<()>;

    /// Scored entries of a contest, best (lowest) score first
    async fn contest_standings(&self, contest_id: &str) -> AppResult<Vec<EntryStanding>>;
}

#[derive(FromRow)]
struct ContestRow {
    id: String,
    address: String,
    chain_id: i64,
    status: ContestStatus,
    settings: Json<ContestSettings>,
    results: Option<Json<ContestResults>>,
    tournament_id: String,
    tournament_status: TournamentStatus,
    current_round: Option<i32>,
}

/// BIGINT columns holding on-chain identifiers must never be negative
fn unsigned(value: i64, column: &str) -> AppResult<u64> {
    u64::try_from(value)
        .map_err(|_| AppError::Internal(format!("Negative {} in ledger: {}", column, value)))
}

impl TryFrom<ContestRow> for Contest {
    type Error = AppError;

    fn try_from(row: ContestRow) -> AppResult<Self> {
        Ok(Contest {
            chain_id: unsigned(row.chain_id, "chain_id")?,
            id: row.id,
            address: row.address,
            status: row.status,
            settings: row.settings.0,
            results: row.results.map(|json| json.0),
            tournament: Tournament {
                id: row.tournament_id,
                status: row.tournament_status,
                current_round: row.current_round,
            },
        })
    }
}

#[derive(FromRow)]
struct StandingRow {
    entry_id: i64,
    entrant: String,
    score: i32,
}

const CONTEST_SELECT: &str = r#"
    SELECT c.id, c.address, c.chain_id, c.status, c.settings, c.results,
           t.id AS tournament_id, t.status AS tournament_status, t.current_round
    FROM contests c
    JOIN tournaments t ON t.id = c.tournament_id
"#;

/// Postgres-backed ledger
pub struct PgContestLedger {
    pub pool: PgPool,
}

impl PgContestLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContestLedger for PgContestLedger {
    async fn find_contest(&self, contest_id: &str) -> AppResult<Option<Contest>> {
        let row = sqlx::query_as::<_, ContestRow>(&format!("{} WHERE c.id = $1", CONTEST_SELECT))
            .bind(contest_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Contest::try_from).transpose()
    }

    async fn find_eligible_contests(&self, filter: &EligibilityFilter) -> AppResult<Vec<Contest>> {
        let statuses: Vec<String> = filter.statuses.iter().map(|s| s.as_str().to_string()).collect();
        let chain_ids = filter
            .chain_ids
            .iter()
            .map(|id| {
                i64::try_from(*id)
                    .map_err(|_| AppError::Config(format!("Chain id {} out of range", id)))
            })
            .collect::<AppResult<Vec<i64>>>()?;
        let tournament_statuses: Vec<String> = filter
            .tournament_statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let rows = sqlx::query_as::<_, ContestRow>(&format!(
            r#"{}
            WHERE c.status::text = ANY($1)
              AND c.chain_id = ANY($2)
              AND t.status::text = ANY($3)
              AND ($4::int IS NULL OR t.current_round >= $4)
            ORDER BY c.created_at ASC
            "#,
            CONTEST_SELECT
        ))
        .bind(statuses)
        .bind(chain_ids)
        .bind(tournament_statuses)
        .bind(filter.min_round)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Contest::try_from).collect()
    }

    async fn record_transition(&self, contest_id: &str, update: &ContestUpdate) -> AppResult<()> {
        // results are write-once: a settled row is never overwritten
        let result = sqlx::query(
            r#"
            UPDATE contests
            SET status = $2,
                results = COALESCE($3, results),
                updated_at = NOW()
            WHERE id = $1 AND ($3::jsonb IS NULL OR results IS NULL)
            "#,
        )
        .bind(contest_id)
        .bind(update.status)
        .bind(update.results.clone().map(Json))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "Contest {} was not updated (missing, or results already recorded)",
                contest_id
            )));
        }

        info!("📝 Contest {} recorded as {}", contest_id, update.status);
        Ok(())
    }

    async fn contest_standings(&self, contest_id: &str) -> AppResult<Vec<EntryStanding>> {
        let rows = sqlx::query_as::<_, StandingRow>(
            r#"
            SELECT entry_id, entrant, score
            FROM contest_entries
            WHERE contest_id = $1 AND score IS NOT NULL
            ORDER BY score ASC, entry_id ASC
            "#,
        )
        .bind(contest_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(EntryStanding {
                    entry_id: unsigned(row.entry_id, "entry_id")?,
                    entrant: row.entrant,
                    score: row.score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(chain_id: i64) -> ContestRow {
        ContestRow {
            id: "c1".to_string(),
            address: "0x0000000000000000000000000000000000000001".to_string(),
            chain_id,
            status: ContestStatus::Open,
            settings: Json(ContestSettings::default()),
            results: None,
            tournament_id: "t1".to_string(),
            tournament_status: TournamentStatus::Upcoming,
            current_round: None,
        }
    }

    #[test]
    fn test_row_keeps_chain_id() {
        let contest = Contest::try_from(row(84532)).unwrap();
        assert_eq!(contest.chain_id, 84532);
    }

    #[test]
    fn test_negative_identifiers_are_rejected() {
        assert!(matches!(
            Contest::try_from(row(-8453)),
            Err(AppError::Internal(_))
        ));
        assert!(unsigned(-1, "entry_id").is_err());
        assert_eq!(unsigned(42, "entry_id").unwrap(), 42);
    }
}
