use teloxide::{
    prelude::*,
    payloads::EditMessageTextSetters,
    types::ParseMode,
};

use crate::config::Config;
use crate::db::Db;
use crate::error::Error;
use crate::order::{Order, OrderId, Roles};
use crate::tracker::{self, Outcome};
use crate::ui::{self, HandlerResult};

/// Order id from the `/track` argument, `#` in front is fine
pub fn parse_order_id(arg: &str) -> Option<OrderId> {
    let arg = arg.trim().trim_start_matches('#');
    arg.parse().ok().map(OrderId)
}

/// Customers see their own orders, staff see everything
pub fn may_see(order: &Order, uid: UserId, roles: &Roles) -> bool {
    order.customer_id == uid || roles.is_staff()
}

/// Shows the order and keeps its card up to date until it's delivered
pub async fn start(
    bot: AutoSend<Bot>,
    mut db: Db,
    config: &Config,
    cid: ChatId,
    uid: UserId,
    roles: &Roles,
    arg: &str,
) -> HandlerResult {
    log::info!("-> track {arg:?}");
    let oid = match parse_order_id(arg) {
        Some(oid) => oid,
        None => {
            bot.send_message(cid, "Which order? Use /track followed by the \
order number, like /track 12").await?;
            return Ok(())
        }
    };

    let order = match db.get_order(oid).await? {
        Some(order) if may_see(&order, uid, roles) => order,
        _ => {
            bot.send_message(cid, format!("Order #{oid} not found")).await?;
            return Ok(())
        }
    };

    let msg = ui::order::send_message(&bot, &order, roles, cid, None::<&str>).await?;
    if !order.is_active() {
        return Ok(())
    }

    let period = config.poll_interval();
    let timeout = config.track_timeout();
    let roles = roles.clone();
    let shown_status = order.status.clone();
    tokio::spawn(async move {
        let fetch = move || {
            let mut db = db.clone();
            async move {
                db.get_order(oid).await.map_err(|e| -> Error { e.into() })
            }
        };
        let on_change = move |order: Order| {
            let bot = bot.clone();
            let msg = msg.clone();
            let roles = roles.clone();
            async move {
                let text = ui::order::render(&order, None::<&str>);
                let res = bot.edit_message_text(msg.chat.id, msg.id, text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(ui::order::keyboard(&order, &roles))
                    .await;
                if let Err(e) = res {
                    log::warn!("could not update tracked order {}: {e:?}", order.id);
                }
            }
        };

        let outcome = tracker::track_for(
            timeout, period, Some(shown_status), fetch, on_change).await;
        match outcome {
            Outcome::Finished(order) =>
                log::info!("stopped tracking order {oid}, it's {}", order.status),
            Outcome::Gone => log::info!("stopped tracking order {oid}, it's gone"),
            Outcome::TimedOut => log::info!("gave up tracking order {oid}"),
        }
    });
    Ok(())
}
