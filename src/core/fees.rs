use crate::core::progress_percent;
use crate::db::competitions::{self, CompetitionRow};
use crate::db::order_executions::{self, OrderExecution};
use crate::db::orders::{self, OrderKind};
use crate::db::Postgres;
use crate::domain::model::{MigrationReport, SolverCompetition};
use crate::domain::num::{big_decimal_to_u256, u256_to_big_decimal};
use crate::domain::ports::Migration;
use crate::utils::error::Result;
use async_trait::async_trait;
use primitive_types::{H160, U256, U512};
use sqlx::PgConnection;
use std::time::{Duration, Instant};

/// Rewrites `order_execution.executed_fee` to be denominated in the order's
/// buy token instead of the sell token, using the clearing prices of the
/// winning settlement.
pub struct ConvertExecutedFees {
    batch_size: i64,
    throttle: Duration,
}

impl ConvertExecutedFees {
    pub const NAME: &'static str = "fees";

    pub fn new(batch_size: i64, throttle: Duration) -> Self {
        Self {
            batch_size,
            throttle,
        }
    }

    async fn convert_auction(
        &self,
        ex: &mut PgConnection,
        row: &CompetitionRow,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let competition: SolverCompetition = match serde_json::from_value(row.json.clone()) {
            Ok(competition) => competition,
            Err(err) => {
                tracing::warn!("failed to decode competition {}: {}", row.id, err);
                report.failed += 1;
                return Ok(());
            }
        };

        let executions = order_executions::fetch(&mut *ex, row.id).await?;

        for execution in executions {
            let order = match orders::fetch_from_orders(&mut *ex, &execution.order_uid).await? {
                Some(order) => order,
                None => {
                    match orders::fetch_from_jit_orders(&mut *ex, &execution.order_uid).await? {
                        Some(order) => order,
                        None => {
                            tracing::warn!(
                                "order not found for order_uid: {:?}, auction_id: {}",
                                execution.order_uid,
                                row.id
                            );
                            report.skipped += 1;
                            continue;
                        }
                    }
                }
            };

            // Only sell orders that still carry the fee in the sell token
            // need conversion.
            if order.kind != OrderKind::Sell || execution.executed_fee_token != order.sell_token {
                continue;
            }

            let Some(winner) = competition.winning_solution() else {
                tracing::warn!("competition {} has no solutions", row.id);
                report.skipped += 1;
                continue;
            };

            let sell_price = winner.clearing_prices.get(&H160(order.sell_token.0));
            let buy_price = winner.clearing_prices.get(&H160(order.buy_token.0));
            let (Some(sell_price), Some(buy_price)) = (sell_price, buy_price) else {
                tracing::warn!(
                    "prices not found for order_uid: {:?}, auction_id: {}",
                    execution.order_uid,
                    row.id
                );
                report.skipped += 1;
                continue;
            };

            let Some(executed_fee) = big_decimal_to_u256(&execution.executed_fee) else {
                tracing::warn!(
                    "stored fee is not a u256 for order_uid: {:?}, auction_id: {}",
                    execution.order_uid,
                    row.id
                );
                report.skipped += 1;
                continue;
            };

            let Some(fee_in_buy_token) = fee_in_buy_token(executed_fee, *sell_price, *buy_price)
            else {
                tracing::warn!(
                    "fee conversion out of range for order_uid: {:?}, auction_id: {}",
                    execution.order_uid,
                    row.id
                );
                report.skipped += 1;
                continue;
            };

            order_executions::update(
                &mut *ex,
                OrderExecution {
                    order_uid: execution.order_uid,
                    auction_id: execution.auction_id,
                    executed_fee: u256_to_big_decimal(&fee_in_buy_token),
                    executed_fee_token: order.buy_token,
                },
            )
            .await?;
            report.processed += 1;
        }

        Ok(())
    }
}

/// `fee * sell_price / buy_price` with a 512 bit intermediate so the
/// product cannot overflow. None when the buy price is zero or the result
/// does not fit a u256.
fn fee_in_buy_token(fee: U256, sell_price: U256, buy_price: U256) -> Option<U256> {
    let scaled = fee.full_mul(sell_price);
    let quotient = scaled.checked_div(U512::from(buy_price))?;
    U256::try_from(quotient).ok()
}

#[async_trait]
impl Migration for ConvertExecutedFees {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, db: &Postgres) -> Result<MigrationReport> {
        let mut report = MigrationReport::new(Self::NAME);
        let started = Instant::now();

        let mut ex = db.pool.begin().await?;

        let Some(start_id) = competitions::highest_competition_id(&mut ex).await? else {
            tracing::info!("solver_competitions is empty, nothing to process");
            report.duration = started.elapsed();
            return Ok(report);
        };

        let mut cursor = start_id;

        loop {
            tracing::info!(
                "converting executed fees from auction {}, done: {:.2}%",
                cursor,
                progress_percent(start_id, cursor)
            );

            let batch = match competitions::fetch_json_batch(&mut ex, cursor, self.batch_size).await
            {
                Ok(batch) => batch,
                Err(err) => {
                    // Step past the offending row; a server-side error also
                    // poisons the transaction, so start a fresh one.
                    tracing::warn!("failed to fetch batch at auction {}: {}", cursor, err);
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
                tracing::info!("no more competitions to process");
                break;
            };
            let last_id = last.id;

            for row in &batch {
                self.convert_auction(&mut ex, row, &mut report).await?;
            }

            // commit each batch separately
            ex.commit().await?;

            tokio::time::sleep(self.throttle).await;

            ex = db.pool.begin().await?;

            // the scan is inclusive, step below the last processed id
            cursor = last_id - 1;
            if cursor <= 0 {
                break;
            }
        }

        report.duration = started.elapsed();
        Ok(report)
    }
}
