use teloxide::{
    prelude::*,
    payloads::SendMessageSetters,
    dispatching::UpdateHandler,
    types::ParseMode,
};

use crate::config::Config;
use crate::db::{Db, StoreError};
use crate::error::Error;
use crate::identity::Directory;
use crate::markup;
use crate::new_order::{self, ItemRequest, NewOrder};
use crate::ui::{self, HandlerResult, MyDialogue};

#[derive(Clone, Default, Debug)]
pub enum State {
    /// Waiting for the item list
    #[default]
    Start,
    ReceivedItems {
        items: Vec<ItemRequest> },
    ReceivedAddress {
        items: Vec<ItemRequest>, address: String },
}

pub fn schema() -> UpdateHandler<Error> {
    dptree::entry()
        .branch(dptree::case![State::Start]
                .endpoint(receive_items))
        .branch(dptree::case![State::ReceivedItems { items }]
                .endpoint(receive_address))
        .branch(dptree::case![State::ReceivedAddress { items, address }]
                .endpoint(receive_instructions))
}

/// Lists every product with its id, price and stock
pub async fn send_catalog(
    bot: &AutoSend<Bot>,
    mut db: Db,
    cid: ChatId,
) -> HandlerResult {
    let products = db.list_products().await?;
    if products.is_empty() {
        bot.send_message(cid, "The store is empty right now").await?;
        return Ok(())
    }
    let lines: Vec<String> = products.iter().map(markup::format_product).collect();
    let text = format!("{}\n\n{}", markup::bold("🛒 Products"), lines.join("\n"));
    bot.send_message(cid, text).parse_mode(ParseMode::Html).await?;
    Ok(())
}

/// Start the checkout dialogue in the chat of `dialogue`
pub async fn start(
    bot: AutoSend<Bot>,
    db: Db,
    config: &Config,
    dialogue: MyDialogue,
) -> HandlerResult {
    log::info!("-> new_order start");
    let cid = dialogue.chat_id();
    send_catalog(&bot, db, cid).await?;
    bot.send_message(cid, format!("\
What would you like? Send product ids with quantities, \
like <code>prod_001 x2, prod_003</code>

Delivery is {} per order. Send /cancel to stop.",
                                  markup::format_price(config.delivery_fee)))
        .parse_mode(ParseMode::Html)
        .await?;
    change_state(dialogue, State::Start).await?;
    Ok(())
}

async fn change_state(dialogue: MyDialogue, state: State) -> HandlerResult {
    dialogue.update(ui::State::NewOrder(state)).await?;
    Ok(())
}

async fn receive_items(
    bot: AutoSend<Bot>,
    msg: Message,
    mut db: Db,
    config: Config,
    dialogue: MyDialogue,
) -> HandlerResult {
    log::info!("-> receive_items");
    let text = match msg.text() {
        Some(text) => text,
        None => {
            bot.send_message(dialogue.chat_id(), "Please write the items as \
text, like prod_001 x2").await?;
            return Ok(())
        }
    };

    let items = match new_order::parse_items(text) {
        Ok(items) => items,
        Err(e) => {
            bot.send_message(dialogue.chat_id(), format!("{e}, please try \
again")).await?;
            return Ok(())
        }
    };

    // Catch missing products and stock before asking for the address
    let products = db.list_products().await?;
    let fee = config.delivery_fee;
    let quote = match new_order::quote(&items, &products, fee) {
        Ok(quote) => quote,
        Err(e) => {
            bot.send_message(dialogue.chat_id(), format!("{e}. Please send \
the list again")).await?;
            return Ok(())
        }
    };
    let mut summary = String::new();
    for item in quote.items.iter() {
        summary.push_str(&format!("{}x {} — {}\n",
                                  item.quantity,
                                  markup::escape_html(&item.name),
                                  markup::format_price(item.total())));
    }
    bot.send_message(dialogue.chat_id(), format!("\
{summary}
Subtotal: {}
Delivery Fee: {}
Total: {}

Where should we deliver it?",
                                                 markup::format_price(quote.subtotal),
                                                 markup::format_price(fee),
                                                 markup::bold(markup::format_price(quote.total))))
        .parse_mode(ParseMode::Html)
        .await?;
    log::info!("received items: {items:?}");
    change_state(dialogue, State::ReceivedItems { items }).await?;
    Ok(())
}

async fn receive_address(
    bot: AutoSend<Bot>,
    msg: Message,
    dialogue: MyDialogue,
    items: Vec<ItemRequest>,
) -> HandlerResult {
    log::info!("-> receive_address");
    let address = msg.text().map(str::trim).unwrap_or_default();
    if address.is_empty() {
        bot.send_message(dialogue.chat_id(), "Delivery address is required. \
Where should we bring the order?").await?;
        return Ok(())
    }

    bot.send_message(dialogue.chat_id(), "Any delivery instructions? \
Send /skip if there are none").await?;
    change_state(dialogue, State::ReceivedAddress {
        items, address: address.to_string() }).await?;
    Ok(())
}

async fn receive_instructions(
    bot: AutoSend<Bot>,
    msg: Message,
    mut db: Db,
    directory: Directory,
    dialogue: MyDialogue,
    (items, address): (Vec<ItemRequest>, String),
) -> HandlerResult {
    log::info!("-> receive_instructions");
    let user = match msg.from() {
        Some(user) => user,
        None => {
            bot.send_message(dialogue.chat_id(), "I don't know who sent this \
message. Thanks, Telegram!").await?;
            return Ok(())
        }
    };
    let delivery_instructions = match msg.text().map(str::trim) {
        None | Some("/skip") => None,
        Some(text) => Some(text.to_string()),
    };

    let new = NewOrder {
        customer_id: user.id,
        items,
        delivery_address: address,
        delivery_instructions,
    };

    match db.create_order(new).await {
        Ok(order) => {
            let roles = directory.roles_of(user.id);
            ui::order::send_message(
                &bot, &order, &roles, dialogue.chat_id(),
                Some(markup::bold("🎉 Order placed!"))).await?;
            dialogue.update(ui::State::Start).await?;
        }
        Err(StoreError::Checkout(e)) => {
            // Stock could have changed while we were chatting
            log::warn!("checkout for {} failed: {e}", user.id);
            bot.send_message(dialogue.chat_id(), format!("{e}. Let's start \
over, send the items again")).await?;
            change_state(dialogue, State::Start).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
