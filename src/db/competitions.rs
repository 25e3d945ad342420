use crate::db::byte_array::{Address, OrderUid};
use bigdecimal::BigDecimal;
use sqlx::{types::JsonValue, PgConnection};

/// A `solver_competitions` row joined with the auction's deadline and
/// surplus capturing jit order owners.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct RichSolverCompetition {
    pub id: i64,
    pub json: JsonValue,
    pub deadline: i64,
    pub surplus_capturing_jit_order_owners: Vec<Address>,
}

/// Fetches competitions older than `before_id`, newest first.
pub async fn fetch_batch(
    ex: &mut PgConnection,
    before_id: i64,
    batch_size: i64,
) -> Result<Vec<RichSolverCompetition>, sqlx::Error> {
    const QUERY: &str = r#"
        SELECT
        sc.id as id,
        sc.json as json,
        COALESCE(ss.block_deadline, 0) AS deadline,
        COALESCE(jit.owners, ARRAY[]::bytea[]) AS surplus_capturing_jit_order_owners
        FROM solver_competitions sc
        LEFT JOIN settlement_scores ss ON sc.id = ss.auction_id
        LEFT JOIN surplus_capturing_jit_order_owners jit ON sc.id = jit.auction_id
        WHERE sc.id < $1
        ORDER BY sc.id DESC
        LIMIT $2;"#;

    sqlx::query_as(QUERY)
        .bind(before_id)
        .bind(batch_size)
        .fetch_all(ex)
        .await
}

/// A bare `solver_competitions` row, without the joins.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct CompetitionRow {
    pub id: i64,
    pub json: JsonValue,
}

/// Fetches competitions with id at most `max_id`, newest first.
pub async fn fetch_json_batch(
    ex: &mut PgConnection,
    max_id: i64,
    batch_size: i64,
) -> Result<Vec<CompetitionRow>, sqlx::Error> {
    const QUERY: &str = r#"
        SELECT id, json
        FROM solver_competitions
        WHERE id <= $1
        ORDER BY id DESC
        LIMIT $2;"#;

    sqlx::query_as(QUERY)
        .bind(max_id)
        .bind(batch_size)
        .fetch_all(ex)
        .await
}

/// Structured auction data destined for the `competition_auctions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Auction {
    pub id: i64,
    pub block: i64,
    pub deadline: i64,
    pub order_uids: Vec<OrderUid>,
    // External native prices
    pub price_tokens: Vec<Address>,
    pub price_values: Vec<BigDecimal>,
    pub surplus_capturing_jit_order_owners: Vec<Address>,
}

/// Inserting an id that was already migrated is a no-op so the backfill can
/// be re-run from scratch.
pub async fn save(ex: &mut PgConnection, auction: Auction) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
INSERT INTO competition_auctions (id, block, deadline, order_uids, price_tokens, price_values, surplus_capturing_jit_order_owners)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (id) DO NOTHING
    ;"#;

    sqlx::query(QUERY)
        .bind(auction.id)
        .bind(auction.block)
        .bind(auction.deadline)
        .bind(auction.order_uids)
        .bind(auction.price_tokens)
        .bind(auction.price_values)
        .bind(auction.surplus_capturing_jit_order_owners)
        .execute(ex)
        .await?;

    Ok(())
}

/// The oldest auction that already made it into `competition_auctions`,
/// None when the table is empty.
pub async fn lowest_migrated_id(ex: &mut PgConnection) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<i64>>("SELECT MIN(id) FROM competition_auctions;")
        .fetch_one(ex)
        .await
}

/// The newest competition on record, None when the table is empty.
pub async fn highest_competition_id(ex: &mut PgConnection) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(id) FROM solver_competitions;")
        .fetch_one(ex)
        .await
}
