use teloxide::{
    prelude::*,
    payloads::SendMessageSetters,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use crate::dashboard::RunnerTab;
use crate::db::Db;
use crate::error::Error;
use crate::identity::Directory;
use crate::markup;
use crate::order::{Order, Role, Roles};
use crate::ui::{self, HandlerResult};

const BTN_DATA_PREFIX: &str = "rd";

pub const MAX_ORDERS_SHOWN: usize = 20;

pub fn tab_button_data(tab: RunnerTab) -> String {
    format!("{BTN_DATA_PREFIX} {}", tab.id())
}

pub fn parse_tab_data(data: &str) -> Option<RunnerTab> {
    let rest = data.strip_prefix(BTN_DATA_PREFIX)?.strip_prefix(' ')?;
    RunnerTab::from_id(rest)
}

fn tabs_keyboard(orders: &[Order]) -> InlineKeyboardMarkup {
    let row: Vec<InlineKeyboardButton> = RunnerTab::ALL.iter().cloned()
        .map(|tab| InlineKeyboardButton::callback(
                format!("{} ({})", tab.human_name(), tab.count(orders)),
                tab_button_data(tab)))
        .collect();
    InlineKeyboardMarkup::new(vec![row])
}

pub async fn show(
    bot: AutoSend<Bot>,
    mut db: Db,
    cid: ChatId,
    roles: &Roles,
) -> HandlerResult {
    log::info!("-> runner_dashboard");
    if !roles.has(Role::Runner) {
        bot.send_message(cid, "Only runners can open the runner dashboard").await?;
        return Ok(())
    }
    let orders = db.list_all_orders().await?;
    bot.send_message(cid, markup::format_runner_stats(&orders))
        .parse_mode(ParseMode::Html)
        .reply_markup(tabs_keyboard(&orders))
        .await?;
    Ok(())
}

async fn show_tab(
    bot: AutoSend<Bot>,
    mut db: Db,
    cid: ChatId,
    roles: &Roles,
    tab: RunnerTab,
) -> HandlerResult {
    log::info!("-> runner_dashboard tab {tab:?}");
    let orders = tab.apply(&db.list_all_orders().await?);
    if orders.is_empty() {
        bot.send_message(cid, tab.empty_text()).await?;
        return Ok(())
    }
    let header = markup::format_list_header(
        tab.human_name(), orders.len(), MAX_ORDERS_SHOWN);
    bot.send_message(cid, header).await?;
    let msg: Option<&str> = None;
    for order in orders.iter().take(MAX_ORDERS_SHOWN) {
        ui::order::send_message(&bot, order, roles, cid, msg).await?;
    }
    Ok(())
}

/// If it's a tab button then handle it and return `true`,
/// otherwise just return `false`
pub async fn try_handle_query(
    bot: AutoSend<Bot>,
    db: Db,
    directory: &Directory,
    q: &CallbackQuery,
    data: &str,
) -> Result<bool, Error> {
    let tab = match parse_tab_data(data) {
        Some(tab) => tab,
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
    if !roles.has(Role::Runner) {
        log::warn!("{} is not a runner but pressed {data:?}", q.from.id);
        return Ok(true)
    }
    show_tab(bot, db, cid, &roles, tab).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_button_data() {
        assert_eq!("rd my_deliveries", tab_button_data(RunnerTab::MyDeliveries));
        for tab in RunnerTab::ALL.iter().cloned() {
            assert_eq!(Some(tab), parse_tab_data(&tab_button_data(tab)));
        }
        assert_eq!(None, parse_tab_data("ad all"));
    }
}
