use crate::db::byte_array::{Address, OrderUid};
use sqlx::PgConnection;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "OrderKind")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderKind {
    #[default]
    Buy,
    Sell,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub sell_token: Address,
    pub buy_token: Address,
    pub kind: OrderKind,
}

pub async fn fetch_from_orders(
    ex: &mut PgConnection,
    order_uid: &OrderUid,
) -> Result<Option<Order>, sqlx::Error> {
    const QUERY: &str = r#"
        SELECT sell_token, buy_token, kind
        FROM orders
        WHERE uid = $1;"#;

    sqlx::query_as(QUERY)
        .bind(order_uid)
        .fetch_optional(ex)
        .await
}

/// Orders created by solvers at settlement time live in their own table.
pub async fn fetch_from_jit_orders(
    ex: &mut PgConnection,
    order_uid: &OrderUid,
) -> Result<Option<Order>, sqlx::Error> {
    const QUERY: &str = r#"
        SELECT sell_token, buy_token, kind
        FROM jit_orders
        WHERE uid = $1;"#;

    sqlx::query_as(QUERY)
        .bind(order_uid)
        .fetch_optional(ex)
        .await
}
