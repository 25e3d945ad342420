use crate::db::byte_array::{Address, OrderUid};
use bigdecimal::BigDecimal;
use sqlx::PgConnection;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct OrderExecution {
    pub order_uid: OrderUid,
    pub auction_id: i64,
    pub executed_fee: BigDecimal,
    pub executed_fee_token: Address,
}

pub async fn fetch(
    ex: &mut PgConnection,
    auction_id: i64,
) -> Result<Vec<OrderExecution>, sqlx::Error> {
    const QUERY: &str = r#"
        SELECT order_uid, auction_id, executed_fee, executed_fee_token
        FROM order_execution
        WHERE auction_id = $1;"#;

    sqlx::query_as(QUERY).bind(auction_id).fetch_all(ex).await
}

/// Rewrites the fee amount and token of an existing row, keyed on
/// (order_uid, auction_id).
pub async fn update(
    ex: &mut PgConnection,
    order_execution: OrderExecution,
) -> Result<(), sqlx::Error> {
    const QUERY: &str = r#"
        UPDATE order_execution
        SET executed_fee = $1, executed_fee_token = $2
        WHERE order_uid = $3 AND auction_id = $4;"#;

    sqlx::query(QUERY)
        .bind(order_execution.executed_fee)
        .bind(order_execution.executed_fee_token)
        .bind(order_execution.order_uid)
        .bind(order_execution.auction_id)
        .execute(ex)
        .await?;

    Ok(())
}
