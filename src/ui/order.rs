use teloxide::{
    prelude::*,
    payloads::{EditMessageTextSetters, SendMessageSetters},
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use crate::error::Error;
use crate::markup;
use crate::order::{action_label, available_update, Order, Roles, StatusUpdate};

/// Order card, optionally with some HTML in front of it
pub fn render<S: AsRef<str>>(order: &Order, prefix: Option<S>) -> String {
    let text = markup::format_order(order);
    match prefix {
        Some(prefix) => format!("{}\n\n{text}", prefix.as_ref()),
        None => text,
    }
}

/// The one button `roles` may press to move the order on, if any
pub fn keyboard(order: &Order, roles: &Roles) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = available_update(order, roles)
        .into_iter()
        .map(|(role, target)| {
            let update = StatusUpdate::new(order.id, target);
            vec![InlineKeyboardButton::callback(
                    action_label(role, target), update.kbd_button_data())]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

/// Send a message that shows this order
///
/// Arguments
///
/// roles: whoever reads the message, the button is picked for them
///
/// prefix: Prepend the order itself with this text
///         Note that it is rendered as HTML
pub async fn send_message<S: AsRef<str>>(
    bot: &AutoSend<Bot>,
    order: &Order,
    roles: &Roles,
    to_chat_id: ChatId,
    prefix: Option<S>,
) -> Result<Message, Error> {
    let text = render(order, prefix);
    let msg = bot.send_message(to_chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard(order, roles))
        .await?;
    Ok(msg)
}

/// Redraws an already sent order card
pub async fn edit_message(
    bot: &AutoSend<Bot>,
    order: &Order,
    roles: &Roles,
    msg: &Message,
) -> Result<(), Error> {
    bot.edit_message_text(msg.chat.id, msg.id, render::<&str>(order, None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard(order, roles))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Role, Status};
    use crate::order::tests::mk_order;
    use teloxide::types::InlineKeyboardButtonKind;

    fn buttons(kb: &InlineKeyboardMarkup) -> Vec<(String, String)> {
        kb.inline_keyboard.iter().flatten()
            .map(|b| {
                let data = match &b.kind {
                    InlineKeyboardButtonKind::CallbackData(d) => d.clone(),
                    other => panic!("unexpected button {other:?}"),
                };
                (b.text.clone(), data)
            })
            .collect()
    }

    #[test]
    fn test_admin_gets_accept_button() {
        let order = mk_order("pending");
        let roles = Roles::none().with(Role::Admin);
        assert_eq!(vec![("Accept Order".to_string(), "su 1 accepted".to_string())],
                   buttons(&keyboard(&order, &roles)));
    }

    #[test]
    fn test_runner_gets_pickup_button() {
        let order = mk_order("accepted");
        let roles = Roles::none().with(Role::Runner);
        let btns = buttons(&keyboard(&order, &roles));
        assert_eq!(1, btns.len());
        assert_eq!(StatusUpdate::new(order.id, Status::Picking).kbd_button_data(),
                   btns[0].1);
    }

    #[test]
    fn test_customer_gets_no_buttons() {
        let order = mk_order("pending");
        let roles = Roles::none().with(Role::Customer);
        assert!(buttons(&keyboard(&order, &roles)).is_empty());
        let order = mk_order("delivered");
        let roles = Roles::none().with(Role::Admin).with(Role::Runner);
        assert!(buttons(&keyboard(&order, &roles)).is_empty());
    }

    #[test]
    fn test_render_prefix() {
        let order = mk_order("pending");
        let s = render(&order, Some("<b>New order</b>"));
        assert!(s.starts_with("<b>New order</b>\n\n<b>Order #1</b>"));
    }
}
