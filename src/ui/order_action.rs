use teloxide::{
    prelude::*,
    payloads::{AnswerCallbackQuerySetters, SendMessageSetters},
    types::ParseMode,
};

use crate::db::{Db, StoreError};
use crate::error::Error;
use crate::identity::Directory;
use crate::markup;
use crate::order::{validate_update_for, Order, Roles, StatusUpdate};
use crate::ui;
use crate::utils;

/// If it's a status button then handle it and return `true`,
/// otherwise just return `false`
///
/// Answers the callback query itself, the refusal reason goes into an alert.
pub async fn try_handle_query(
    bot: AutoSend<Bot>,
    mut db: Db,
    directory: &Directory,
    q: &CallbackQuery,
    data: &str,
) -> Result<bool, Error> {
    let update = match StatusUpdate::try_parse(data) {
        Some(update) => update,
        None => return Ok(false),
    };
    log::info!("  got status update from callback query {update:?}");

    let uid = q.from.id;
    let roles = directory.roles_of(uid);

    match perform_update(&mut db, &update, &roles).await {
        Ok(order) => {
            let info = order.info();
            bot.answer_callback_query(q.id.clone())
                .text(format!("Order #{} is now {}", order.id, info.label))
                .await?;

            if let Some(msg) = &q.message {
                if let Err(e) = ui::order::edit_message(&bot, &order, &roles, msg).await {
                    log::warn!("could not redraw order {}: {e:?}", order.id);
                }
            } else {
                log::warn!("Message is missing in callback query");
            }

            notify_customer(&bot, &order).await;
        }
        Err(e @ StoreError::Backend(_)) => {
            bot.answer_callback_query(q.id.clone())
                .text("Something went wrong, please try again")
                .await?;
            return Err(e.into())
        }
        Err(e) => {
            log::warn!("status update {update:?} by {uid} refused: {e}");
            bot.answer_callback_query(q.id.clone())
                .text(e.to_string())
                .show_alert(true)
                .await?;
        }
    }
    Ok(true)
}

/// Validates against the freshest copy of the order, then lets the store
/// validate once more while it writes
async fn perform_update(
    db: &mut Db,
    update: &StatusUpdate,
    roles: &Roles,
) -> Result<Order, StoreError> {
    let order = db.get_order(update.order_id).await?
        .ok_or(StoreError::OrderNotFound(update.order_id))?;
    validate_update_for(&order, &update.requested, roles)?;
    db.update_status(update.order_id, &update.requested, roles).await
}

/// Tells the customer where their order is now
///
/// Failing to notify doesn't undo the update, so it's only logged.
async fn notify_customer(bot: &AutoSend<Bot>, order: &Order) {
    let cid = match utils::uid_to_cid(order.customer_id) {
        Some(cid) => cid,
        None => {
            log::warn!("order {} has no private chat to notify", order.id);
            return
        }
    };
    let info = order.info();
    let label = markup::escape_html(&info.label).to_string();
    let text = format!("{} Your order #{} is now {}\n{}",
                       info.icon, order.id, markup::bold(label),
                       markup::italic(info.description));
    if let Err(e) = bot.send_message(cid, text)
        .parse_mode(ParseMode::Html)
        .await
    {
        log::warn!("could not notify {} about order {}: {e:?}",
                   order.customer_id, order.id);
    }
}
