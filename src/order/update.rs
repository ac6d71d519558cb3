use crate::order::{OrderId, Status};

/// Requested status change for a specific order
///
/// This is what a status button carries. `requested` is kept as the raw
/// string, it's validated only when the button is pressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    pub order_id: OrderId,
    pub requested: String,
}

impl StatusUpdate {
    const BTN_DATA_PREFIX: &'static str = "su";

    pub fn new(order_id: OrderId, target: Status) -> StatusUpdate {
        StatusUpdate { order_id, requested: target.id().to_string() }
    }

    /// Serializes it in a way that can be parsed by `try_parse`
    pub fn kbd_button_data(&self) -> String {
        format!("{} {} {}",
                StatusUpdate::BTN_DATA_PREFIX,
                self.order_id.0,
                self.requested)
    }

    /// If `data` can be parsed as StatusUpdate it returns it, otherwise None
    ///
    /// Who pressed the button is not part of the data, it comes from
    /// the callback itself.
    pub fn try_parse(data: &str) -> Option<StatusUpdate> {
        let mut args = data.split(' ');

        let magic = args.next()?;
        if magic != Self::BTN_DATA_PREFIX { return None }

        let order_id = args.next()?;
        let order_id = OrderId(order_id.parse().ok()?);
        let requested = args.next()?;
        if requested.is_empty() { return None }

        // Too many arguments
        if args.next().is_some() { return None }

        Some(StatusUpdate { order_id, requested: requested.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_data() {
        let su = StatusUpdate::new(OrderId(42), Status::OutForDelivery);
        assert_eq!("su 42 out_for_delivery", su.kbd_button_data());
        assert_eq!(Some(su.clone()), StatusUpdate::try_parse(&su.kbd_button_data()));
    }

    #[test]
    fn test_parse_keeps_unknown_status() {
        let su = StatusUpdate::try_parse("su 7 teleported").unwrap();
        assert_eq!(OrderId(7), su.order_id);
        assert_eq!("teleported", su.requested);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(None, StatusUpdate::try_parse("oa 7 picking"));
        assert_eq!(None, StatusUpdate::try_parse("su x picking"));
        assert_eq!(None, StatusUpdate::try_parse("su 7"));
        assert_eq!(None, StatusUpdate::try_parse("su 7 "));
        assert_eq!(None, StatusUpdate::try_parse("su 7 picking extra"));
        assert_eq!(None, StatusUpdate::try_parse("list_my_orders"));
    }
}
