use teloxide::{
    prelude::*,
    dispatching::{
        dialogue::{self, InMemStorage},
        UpdateHandler,
    },
};

pub mod admin_dashboard;
pub mod commands;
pub mod main_menu;
pub mod my_orders;
pub mod new_order;
pub mod order;
pub mod order_action;
pub mod runner_dashboard;
pub mod track;

use crate::config::Config;
use crate::db::Db;
use crate::error::Error;
use crate::identity::Directory;

pub type HandlerResult = Result<(), Error>;
pub type MyDialogue = Dialogue<State, InMemStorage<State>>;
pub type MyStorage = InMemStorage<State>;

#[derive(Clone, Default, Debug)]
pub enum State {
    #[default]
    Start,
    NewOrder(new_order::State)
}

pub fn schema() -> UpdateHandler<Error> {
    let command_handler = teloxide::filter_command::<commands::Command, _>()
        .endpoint(commands::handle_command);

    // Commands first so /cancel works in the middle of a dialogue
    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(dptree::case![State::NewOrder(s)].branch(new_order::schema()));

    let callback_query_handler = Update::filter_callback_query()
        .endpoint(handle_callback_query);

    dialogue::enter::<Update, MyStorage, State, _>()
        .branch(message_handler)
        .branch(callback_query_handler)
}

async fn handle_callback_query(
    bot: AutoSend<Bot>,
    q: CallbackQuery,
    db: Db,
    directory: Directory,
    config: Config,
    dialogue: MyDialogue,
) -> HandlerResult {
    log::info!("-> handle_callback_query, query: {q:?}");
    let data = match &q.data {
        Some(data) => data.clone(),
        None => {
            bot.answer_callback_query(q.id.clone()).await?;
            return Ok(())
        }
    };

    if order_action::try_handle_query(
        bot.clone(), db.clone(), &directory, &q, &data).await? {
        return Ok(())
    }

    bot.answer_callback_query(q.id.clone()).await?;

    if admin_dashboard::try_handle_query(
        bot.clone(), db.clone(), &directory, &q, &data).await? {
        return Ok(())
    }
    if runner_dashboard::try_handle_query(
        bot.clone(), db.clone(), &directory, &q, &data).await? {
        return Ok(())
    }

    match main_menu::MainMenuItem::from_id(&data) {
        Some(item) => {
            let roles = directory.roles_of(q.from.id);
            main_menu::handle_item(bot, &q, db, &config, &roles, item, dialogue)
                .await?;
        }
        None => log::warn!("unknown button {data:?}"),
    }
    Ok(())
}
