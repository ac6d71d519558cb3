use chrono::Duration;
use askama_escape::{escape, Html, Escaped};
use std::borrow::Cow;
use std::fmt::Write;

use crate::order::{progress, Order, StepState};
use crate::dashboard::{AdminStats, RunnerTab};
use crate::product::Product;
use crate::{DateTime, Offset};

/// Cents to dollars, `$12.50`
pub fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

pub fn escape_html(s: &str) -> Escaped<'_, Html> {
    escape(s, Html)
}

pub fn bold<S: AsRef<str>>(s: S) -> String {
    format!("<b>{}</b>", s.as_ref())
}

pub fn italic<S: AsRef<str>>(s: S) -> String {
    format!("<i>{}</i>", s.as_ref())
}

pub fn time_ago(t: DateTime) -> String {
    let now = Offset::now();
    let dur = t.signed_duration_since(now);
    if dur.is_zero() {
        return "right now".to_string();
    }
    let is_future = dur > Duration::zero();
    let dur = if is_future { dur } else { -dur };

    let amount = human_positive_duration(dur);
    let future_or_past = if is_future { "from now" } else { "ago" };
    format!("{amount} {future_or_past}")
}

/// Give me number and a word, I give you plural word
fn pluralize<'a>(n: u64, what: &'a str) -> Cow<'a, str> {
    let plur = || -> Cow<'a, str> { format!("{what}s").into() };
    let sing = || -> Cow<'a, str> { what.into() };
    match n {
        0 => plur(),
        1 => sing(),
        _ => plur(),
    }
}

pub fn human_positive_duration(dur: Duration) -> String {
    if dur.num_weeks() > 0 {
        let w = dur.num_weeks() as u64;
        return format!("{} {}", w, pluralize(w, "week"));
    }

    if dur.num_days() > 0 {
        let d = dur.num_days() as u64;
        return format!("{} {}", d, pluralize(d, "day"));
    }

    if dur.num_hours() > 0 {
        let h = dur.num_hours() as u64;
        return format!("{} {}", h, pluralize(h, "hour"));
    }

    if dur.num_minutes() > 0 {
        let m = dur.num_minutes() as u64;
        return format!("{} {}", m, pluralize(m, "minute"));
    }

    if dur.num_seconds() > 30 {
        return "about a minute".to_string()
    }

    if dur > Duration::zero() {
        return "few seconds".to_string()
    }

    "just now".to_string()
}

/// One line per step, `✓` for done ones and the step icon for the rest
pub fn format_progress(status: &str) -> String {
    let mut ret = String::new();
    for step in progress(status) {
        let line = match step.state {
            StepState::Completed => format!("✓ {}", step.status.label()),
            StepState::Current   => bold(format!("{} {}", step.status.icon(),
                                                 step.status.label())),
            StepState::Pending   => format!("· {}", step.status.label()),
        };
        ret.push_str(&line);
        ret.push('\n');
    }
    ret
}

/// Status line, with the tracker for orders still on their way
pub fn format_status(order: &Order) -> String {
    let info = order.info();
    let label = escape_html(&info.label).to_string();
    if order.is_active() {
        let mut s = format!("{} {}", info.icon, bold(label));
        if !info.description.is_empty() {
            s.push_str(&format!("\n{}", italic(info.description)));
        }
        if info.step_index > 0 {
            s.push_str(&format!("\n\n{}", format_progress(&order.status)));
        }
        s
    } else {
        let when = order.delivered_at
            .map(|t| format!(" {}", time_ago(t)))
            .unwrap_or_default();
        format!("{} {}{when}", info.icon, bold(format!("✓ {label}")))
    }
}

pub fn format_items(order: &Order) -> String {
    let mut s = String::new();
    for item in order.items.iter() {
        let _ = writeln!(s, "{}x {} — {}",
                         item.quantity,
                         escape_html(&item.name),
                         format_price(item.total()));
    }
    s
}

/// Full order card as shown in chats
pub fn format_order(order: &Order) -> String {
    let title = bold(format!("Order #{}", order.id));
    let created = time_ago(order.created_at);
    let status = format_status(order);
    let items = format_items(order);
    let address = escape_html(&order.delivery_address);
    let note = match &order.delivery_instructions {
        Some(note) => format!("\nNote: {}", escape_html(note)),
        None => "".to_string(),
    };
    let subtotal = format_price(order.subtotal);
    let fee = format_price(order.delivery_fee);
    let total = bold(format_price(order.total));

    format!("\
{title}, placed {created}
{status}

📍 {address}{note}

{items}
Subtotal: {subtotal}
Delivery Fee: {fee}
Total: {total}
")
}

pub fn format_product(product: &Product) -> String {
    let category = product.category.as_deref()
        .map(|c| format!(" ({})", escape_html(c)))
        .unwrap_or_default();
    format!("{} {}{category} — {}, {} left",
            bold(escape_html(&product.product_id).to_string()),
            escape_html(&product.name),
            format_price(product.price),
            product.stock)
}

pub fn format_admin_stats(stats: &AdminStats) -> String {
    format!("\
{}
Total orders: {}
Pending: {}
In progress: {}
Delivered: {}",
            bold("📋 Admin Dashboard"),
            stats.total, stats.pending, stats.in_progress, stats.delivered)
}

pub fn format_runner_stats(orders: &[Order]) -> String {
    let mut s = bold("🚴 Runner Dashboard");
    for tab in RunnerTab::ALL.iter().cloned() {
        let _ = write!(s, "\n{}: {}", tab.human_name(), tab.count(orders));
    }
    s
}

/// Heading for a list of orders that may be cut at `max`
pub fn format_list_header(title: &str, total: usize, max: usize) -> String {
    if total > max {
        format!("{title}: showing {max} of {total} orders")
    } else {
        format!("{title}: {total} {}", pluralize(total as u64, "order"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::order::tests::mk_order;

    #[test]
    fn test_humanize_positive_duration() {
        assert_eq!("4 weeks".to_string(),
                   human_positive_duration(Duration::weeks(4)));
        assert_eq!("5 days".to_string(),
                   human_positive_duration(Duration::days(5)));
        assert_eq!("1 minute".to_string(),
                   human_positive_duration(Duration::minutes(1)
                                           + Duration::seconds(5)));
    }

    #[test]
    fn test_format_price() {
        assert_eq!("$0.00", format_price(0));
        assert_eq!("$2.00", format_price(200));
        assert_eq!("$12.05", format_price(1205));
    }

    #[test]
    fn test_list_header() {
        assert_eq!("Accepted: 1 order", format_list_header("Accepted", 1, 20));
        assert_eq!("All: 20 orders", format_list_header("All", 20, 20));
        assert_eq!("All: showing 20 of 35 orders", format_list_header("All", 35, 20));
    }

    #[test]
    fn test_format_progress() {
        let s = format_progress("accepted");
        assert_eq!("✓ Order Placed\n<b>✅ Accepted</b>\n· Being Picked\n· On The Way\n· Delivered\n", s);
    }

    #[test]
    fn test_order_is_escaped() {
        let mut order = mk_order("pending");
        order.delivery_address = "<script>Room 1</script>".to_string();
        order.delivery_instructions = Some("knock & wait".to_string());
        let s = format_order(&order);
        assert!(s.contains("&lt;script&gt;Room 1"));
        assert!(s.contains("knock &amp; wait"));
        assert!(s.contains("Total: <b>$5.00</b>"));
    }

    #[test]
    fn test_delivered_gets_badge_not_tracker() {
        let order = mk_order("delivered");
        let s = format_status(&order);
        assert!(s.contains("✓ Delivered"));
        assert!(!s.contains("Order Placed"));
    }

    #[test]
    fn test_unknown_status_has_no_tracker() {
        let order = mk_order("on_hold");
        let s = format_status(&order);
        assert!(s.contains("on_hold"));
        assert!(!s.contains("Order Placed"));
    }
}
