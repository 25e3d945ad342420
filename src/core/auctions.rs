use crate::core::progress_percent;
use crate::db::byte_array::ByteArray;
use crate::db::competitions::{self, Auction, RichSolverCompetition};
use crate::db::Postgres;
use crate::domain::model::{MigrationReport, SolverCompetition};
use crate::domain::num::u256_to_big_decimal;
use crate::domain::ports::Migration;
use crate::utils::error::{MigrationError, Result};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Backfills the structured `competition_auctions` table from the legacy
/// `solver_competitions` json blobs, walking backwards from the oldest
/// auction that was already migrated.
pub struct PopulateHistoricAuctions {
    batch_size: i64,
    throttle: Duration,
}

impl PopulateHistoricAuctions {
    pub const NAME: &'static str = "auctions";

    pub fn new(batch_size: i64, throttle: Duration) -> Self {
        Self {
            batch_size,
            throttle,
        }
    }

    fn build_auction(row: &RichSolverCompetition) -> Result<Auction> {
        let competition: SolverCompetition = serde_json::from_value(row.json.clone())?;

        let block = i64::try_from(competition.auction_start_block).map_err(|_| {
            MigrationError::ProcessingError {
                message: format!("auction {} start block overflows i64", row.id),
            }
        })?;

        Ok(Auction {
            id: row.id,
            block,
            deadline: row.deadline,
            order_uids: competition
                .auction
                .orders
                .iter()
                .map(|order| ByteArray(order.0))
                .collect(),
            price_tokens: competition
                .auction
                .prices
                .keys()
                .map(|token| ByteArray(token.0))
                .collect(),
            price_values: competition
                .auction
                .prices
                .values()
                .map(u256_to_big_decimal)
                .collect(),
            surplus_capturing_jit_order_owners: row.surplus_capturing_jit_order_owners.clone(),
        })
    }
}

#[async_trait]
impl Migration for PopulateHistoricAuctions {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, db: &Postgres) -> Result<MigrationReport> {
        let mut report = MigrationReport::new(Self::NAME);
        let started = Instant::now();

        let mut ex = db.pool.begin().await?;

        let Some(start_id) = competitions::lowest_migrated_id(&mut ex).await? else {
            tracing::info!("competition_auctions is empty, nothing to process");
            report.duration = started.elapsed();
            return Ok(report);
        };

        let mut cursor = start_id;

        loop {
            tracing::info!(
                "populating historic auctions below auction {}, done: {:.2}%",
                cursor,
                progress_percent(start_id, cursor)
            );

            let batch = match competitions::fetch_batch(&mut ex, cursor, self.batch_size).await {
                Ok(batch) => batch,
                Err(err) => {
                    // Some rows hold a null json column; step past them one
                    // id at a time. A server-side error also poisons the
                    // transaction, so start a fresh one either way.
                    tracing::warn!("failed to fetch batch below auction {}: {}", cursor, err);
                    report.skipped += 1;
                    cursor -= 1;
                    ex.rollback().await?;
                    ex = db.pool.begin().await?;
                    if cursor <= 0 {
                        break;
                    }
                    continue;
                }
            };

            let Some(last) = batch.last() else {
                tracing::info!("no more auctions to process");
                break;
            };
            let last_id = last.id;

            for row in &batch {
                match Self::build_auction(row) {
                    Ok(auction) => match competitions::save(&mut ex, auction).await {
                        Ok(()) => report.processed += 1,
                        Err(err) => {
                            tracing::error!("failed to save auction {}: {:?}", row.id, err);
                            report.failed += 1;
                        }
                    },
                    Err(err) => {
                        tracing::warn!("failed to decode auction {}: {}", row.id, err);
                        report.failed += 1;
                    }
                }
            }

            // commit each batch separately
            ex.commit().await?;

            tokio::time::sleep(self.throttle).await;

            ex = db.pool.begin().await?;
            cursor = last_id;
        }

        report.duration = started.elapsed();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::{H160, U256};
    use sqlx::types::JsonValue;

    fn competition_json(start_block: u64) -> JsonValue {
        let uid = format!("0x{}", "11".repeat(56));
        serde_json::json!({
            "auctionStartBlock": start_block,
            "competitionSimulationBlock": start_block.saturating_add(4),
            "auction": {
                "orders": [uid],
                "prices": {
                    "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2": "1000000000000000000",
                },
            },
            "solutions": [],
        })
    }

    fn rich_row(id: i64, json: JsonValue) -> RichSolverCompetition {
        RichSolverCompetition {
            id,
            json,
            deadline: 42,
            surplus_capturing_jit_order_owners: vec![ByteArray([0xcc; 20])],
        }
    }

    #[test]
    fn test_build_auction_maps_all_columns() {
        let row = rich_row(7, competition_json(1_000));
        let auction = PopulateHistoricAuctions::build_auction(&row).unwrap();

        assert_eq!(auction.id, 7);
        assert_eq!(auction.block, 1_000);
        assert_eq!(auction.deadline, 42);
        assert_eq!(auction.order_uids, vec![ByteArray([0x11; 56])]);
        let weth = H160(auction.price_tokens[0].0);
        assert_eq!(
            format!("{weth:?}"),
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
        );
        assert_eq!(
            auction.price_values,
            vec![u256_to_big_decimal(&U256::from(
                1_000_000_000_000_000_000u64
            ))]
        );
        assert_eq!(
            auction.surplus_capturing_jit_order_owners,
            vec![ByteArray([0xcc; 20])]
        );
    }

    #[test]
    fn test_build_auction_rejects_block_overflow() {
        let row = rich_row(7, competition_json(u64::MAX));
        assert!(PopulateHistoricAuctions::build_auction(&row).is_err());
    }

    #[test]
    fn test_build_auction_rejects_malformed_blob() {
        let row = rich_row(7, serde_json::json!({"unexpected": true}));
        assert!(PopulateHistoricAuctions::build_auction(&row).is_err());
    }
}
