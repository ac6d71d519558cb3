use crate::config::Config;
use crate::db::Db;
use crate::identity::Directory;
use crate::ui::{self, HandlerResult, MyDialogue};
use teloxide::{
    prelude::*,
    utils::command::BotCommands,
};
use std::fmt::Write;

#[derive(BotCommands, Clone)]
#[command(rename = "snake_case",
          description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Start here")]
    Start,
    #[command(description = "Show main menu")]
    Menu,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Show the products")]
    Products,
    #[command(description = "Place a new order")]
    NewOrder,
    #[command(description = "Show my orders")]
    MyOrders,
    #[command(description = "Follow an order, e.g. /track 12")]
    Track(String),
    #[command(description = "Admin dashboard")]
    Admin,
    #[command(description = "Runner dashboard")]
    Runner,
    #[command(description = "Show what I can do")]
    Me,
    #[command(description = "Stop placing an order")]
    Cancel,
}

fn help() -> String {
    let cmds = Command::descriptions();
    format!("\
Order snacks and supplies and get them delivered on campus.
Here is my commands:
{cmds}
")
}

/// Shows the groups and roles the user has
async fn send_me(
    bot: AutoSend<Bot>,
    directory: &Directory,
    cid: ChatId,
    uid: UserId,
) -> HandlerResult {
    let groups = directory.groups_of(uid);
    let roles = directory.roles_of(uid);

    let mut ret = format!("You are user {uid}, acting as {roles}\n");
    if groups.is_empty() {
        ret.push_str("You're not in any staff group");
    } else {
        ret.push_str("\nGroups:\n");
    }
    for group in groups.into_iter() {
        writeln!(&mut ret, " - {group}")?;
    }
    bot.send_message(cid, ret).await?;
    Ok(())
}

pub async fn handle_command(
    bot: AutoSend<Bot>,
    msg: Message,
    command: Command,
    db: Db,
    directory: Directory,
    config: Config,
    dialogue: MyDialogue,
) -> HandlerResult {
    let cid = msg.chat.id;
    let uid = match msg.from() {
        Some(user) => user.id,
        None => {
            bot.send_message(cid, "I don't know who sent this message. \
Thanks, Telegram!").await?;
            return Ok(())
        }
    };
    let roles = directory.roles_of(uid);

    match command {
        Command::Start    => { ui::main_menu::main_menu(bot, cid, &roles).await? },
        Command::Menu     => { ui::main_menu::main_menu(bot, cid, &roles).await? },
        Command::Help     => { bot.send_message(cid, help()).await?; },
        Command::Products => { ui::new_order::send_catalog(&bot, db, cid).await? },
        Command::NewOrder => { ui::new_order::start(bot, db, &config, dialogue).await? },
        Command::MyOrders => {
            ui::my_orders::show_my_orders(bot, db, cid, uid, &roles).await?
        },
        Command::Track(arg) => {
            ui::track::start(bot, db, &config, cid, uid, &roles, &arg).await?
        },
        Command::Admin    => { ui::admin_dashboard::show(bot, db, cid, &roles).await? },
        Command::Runner   => { ui::runner_dashboard::show(bot, db, cid, &roles).await? },
        Command::Me       => { send_me(bot, &directory, cid, uid).await? },
        Command::Cancel   => {
            dialogue.exit().await?;
            bot.send_message(cid, "Cancelled").await?;
        },
    }
    Ok(())
}
