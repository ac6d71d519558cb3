use crate::config::Config;
use crate::db::Db;
use crate::order::{Role, Roles};
use crate::ui::{self, HandlerResult, MyDialogue};

use teloxide::{
    prelude::*,
    payloads::SendMessageSetters,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainMenuItem {
    Products,
    NewOrder,
    MyOrders,
    AdminDashboard,
    RunnerDashboard,
}

impl MainMenuItem {
    pub const ALL: &'static [MainMenuItem] =
        &[ MainMenuItem::Products,
           MainMenuItem::NewOrder,
           MainMenuItem::MyOrders,
           MainMenuItem::AdminDashboard,
           MainMenuItem::RunnerDashboard ];

    pub const fn human_name(&self) -> &'static str {
        match self {
            MainMenuItem::Products        => "🛒 Products",
            MainMenuItem::NewOrder        => "New Order",
            MainMenuItem::MyOrders        => "My Orders",
            MainMenuItem::AdminDashboard  => "📋 Admin Dashboard",
            MainMenuItem::RunnerDashboard => "🚴 Runner Dashboard",
        }
    }

    pub const fn id(&self) -> &'static str {
        match self {
            MainMenuItem::Products        => "products",
            MainMenuItem::NewOrder        => "new_order",
            MainMenuItem::MyOrders        => "my_orders",
            MainMenuItem::AdminDashboard  => "admin_dashboard",
            MainMenuItem::RunnerDashboard => "runner_dashboard",
        }
    }

    pub fn from_id(s: &str) -> Option<MainMenuItem> {
        MainMenuItem::ALL.iter().cloned().find(|item| item.id() == s)
    }

    /// Dashboards are only offered to those who can open them
    pub fn visible_for(&self, roles: &Roles) -> bool {
        match self {
            MainMenuItem::AdminDashboard  => roles.has(Role::Admin),
            MainMenuItem::RunnerDashboard => roles.has(Role::Runner),
            _ => true,
        }
    }

    pub fn items_for(roles: &Roles) -> Vec<MainMenuItem> {
        MainMenuItem::ALL.iter().cloned()
            .filter(|item| item.visible_for(roles))
            .collect()
    }
}

/// Shows the main menu with buttons
pub async fn main_menu(
    bot: AutoSend<Bot>,
    cid: ChatId,
    roles: &Roles,
) -> HandlerResult {
    log::info!("-> main_menu for {roles}");
    let main_menu_items = MainMenuItem::items_for(roles)
        .into_iter()
        .map(|item| [InlineKeyboardButton::callback(
                        item.human_name(), item.id())]);

    bot.send_message(cid, "What would you like to do?")
        .reply_markup(InlineKeyboardMarkup::new(main_menu_items))
        .await?;

    Ok(())
}

pub async fn handle_item(
    bot: AutoSend<Bot>,
    q: &CallbackQuery,
    db: Db,
    config: &Config,
    roles: &Roles,
    menu_item: MainMenuItem,
    dialogue: MyDialogue,
) -> HandlerResult {
    log::info!("main_menu = {menu_item:?}");
    let cid = dialogue.chat_id();
    if let Some(msg) = &q.message {
        bot.delete_message(msg.chat.id, msg.id).await?;
    }
    match menu_item {
        MainMenuItem::Products => {
            ui::new_order::send_catalog(&bot, db, cid).await?;
        },
        MainMenuItem::NewOrder => {
            ui::new_order::start(bot, db, config, dialogue).await?;
        },
        MainMenuItem::MyOrders => {
            ui::my_orders::show_my_orders(bot, db, cid, q.from.id, roles).await?;
        },
        MainMenuItem::AdminDashboard => {
            ui::admin_dashboard::show(bot, db, cid, roles).await?;
        },
        MainMenuItem::RunnerDashboard => {
            ui::runner_dashboard::show(bot, db, cid, roles).await?;
        },
    }
    Ok(())
}
