use crate::db::Db;
use crate::order::Roles;
use crate::ui::{self, HandlerResult};
use teloxide::prelude::*;

/// Only the newest ones, older orders are still reachable with /track
pub const MAX_ORDERS_SHOWN: usize = 10;

pub async fn show_my_orders(
    bot: AutoSend<Bot>,
    mut db: Db,
    cid: ChatId,
    uid: UserId,
    roles: &Roles,
) -> HandlerResult {
    log::info!("-> show_my_orders");
    let orders = db.orders_by_customer(uid).await?;
    if orders.is_empty() {
        bot.send_message(cid, "📦 No orders yet. Place one with /new_order")
            .await?;
        return Ok(())
    }

    let active = orders.iter().filter(|o| o.is_active()).count();
    let mut header = format!("Your orders: {} active, {} total",
                             active, orders.len());
    if orders.len() > MAX_ORDERS_SHOWN {
        header.push_str(&format!(", showing the newest {MAX_ORDERS_SHOWN}"));
    }
    bot.send_message(cid, header).await?;
    let msg: Option<&str> = None;
    for order in orders.iter().take(MAX_ORDERS_SHOWN) {
        ui::order::send_message(&bot, order, roles, cid, msg).await?;
    }
    Ok(())
}
