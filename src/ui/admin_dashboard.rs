use teloxide::{
    prelude::*,
    payloads::SendMessageSetters,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use crate::dashboard::{admin_stats, AdminFilter};
use crate::db::Db;
use crate::error::Error;
use crate::identity::Directory;
use crate::markup;
use crate::order::{Order, Role, Roles};
use crate::ui::{self, HandlerResult};

const BTN_DATA_PREFIX: &str = "ad";

/// Don't flood the chat, the filters narrow it down
pub const MAX_ORDERS_SHOWN: usize = 20;

pub fn filter_button_data(filter: AdminFilter) -> String {
    format!("{BTN_DATA_PREFIX} {}", filter.id())
}

pub fn parse_filter_data(data: &str) -> Option<AdminFilter> {
    let rest = data.strip_prefix(BTN_DATA_PREFIX)?.strip_prefix(' ')?;
    AdminFilter::from_id(rest)
}

/// One button per filter with the number of matching orders
fn filters_keyboard(orders: &[Order]) -> InlineKeyboardMarkup {
    let btns: Vec<InlineKeyboardButton> = AdminFilter::all_filters()
        .into_iter()
        .map(|f| {
            let n = orders.iter().filter(|o| f.matches(o)).count();
            InlineKeyboardButton::callback(
                format!("{} ({n})", f.human_name()), filter_button_data(f))
        })
        .collect();
    let rows: Vec<Vec<InlineKeyboardButton>> =
        btns.chunks(3).map(|c| c.to_vec()).collect();
    InlineKeyboardMarkup::new(rows)
}

/// Stats for every order and the filter buttons
pub async fn show(
    bot: AutoSend<Bot>,
    mut db: Db,
    cid: ChatId,
    roles: &Roles,
) -> HandlerResult {
    log::info!("-> admin_dashboard");
    if !roles.has(Role::Admin) {
        bot.send_message(cid, "Only admins can open the admin dashboard").await?;
        return Ok(())
    }
    let orders = db.list_all_orders().await?;
    let text = markup::format_admin_stats(&admin_stats(&orders));
    bot.send_message(cid, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(filters_keyboard(&orders))
        .await?;
    Ok(())
}

async fn show_filtered(
    bot: AutoSend<Bot>,
    mut db: Db,
    cid: ChatId,
    roles: &Roles,
    filter: AdminFilter,
) -> HandlerResult {
    log::info!("-> admin_dashboard filter {filter:?}");
    let orders = filter.apply(&db.list_all_orders().await?);
    if orders.is_empty() {
        bot.send_message(cid, "No orders found").await?;
        return Ok(())
    }
    let header = markup::format_list_header(
        filter.human_name(), orders.len(), MAX_ORDERS_SHOWN);
    bot.send_message(cid, header).await?;
    let msg: Option<&str> = None;
    for order in orders.iter().take(MAX_ORDERS_SHOWN) {
        ui::order::send_message(&bot, order, roles, cid, msg).await?;
    }
    Ok(())
}

/// If it's a filter button then handle it and return `true`,
/// otherwise just return `false`
pub async fn try_handle_query(
    bot: AutoSend<Bot>,
    db: Db,
    directory: &Directory,
    q: &CallbackQuery,
    data: &str,
) -> Result<bool, Error> {
    let filter = match parse_filter_data(data) {
        Some(filter) => filter,
        None => return Ok(false),
    };
    let cid = match &q.message {
        Some(msg) => msg.chat.id,
        None => {
            log::warn!("Message is missing in callback query");
            return Ok(true)
        }
    };
    let roles = directory.roles_of(q.from.id);
    if !roles.has(Role::Admin) {
        log::warn!("{} is not an admin but pressed {data:?}", q.from.id);
        return Ok(true)
    }
    show_filtered(bot, db, cid, &roles, filter).await?;
    Ok(true)
}
