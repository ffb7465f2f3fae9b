use crate::models::order::PackageState;

pub const DELIVERY_SHIPPING_CANCELED: &str = "Shipping canceled";

const DELIVERED_ORDER_STATUSES: [&str; 2] = ["COMPLETE", "CLOSED"];
const RETURNED_ORDER_STATUSES: [&str; 2] = ["SUSPECTED_FRAUD", "CANCELED"];
const PENDING_ORDER_STATUSES: [&str; 4] = ["PENDING", "ON_HOLD", "PAYMENT_REVIEW", "PENDING_PAYMENT"];

/// Collapses the carrier delivery status and the fulfillment order status into
/// one customer-facing state. Order status wins wherever the two disagree.
///
/// Total over arbitrary strings: anything unrecognised reads as in transit.
pub fn resolve(delivery_status: &str, order_status: &str) -> PackageState {
    let order_status = order_status.trim();

    if DELIVERED_ORDER_STATUSES.contains(&order_status) {
        PackageState::Delivered
    } else if RETURNED_ORDER_STATUSES.contains(&order_status) {
        PackageState::Returned
    } else if delivery_status.trim() == DELIVERY_SHIPPING_CANCELED {
        PackageState::Returned
    } else if PENDING_ORDER_STATUSES.contains(&order_status) {
        PackageState::Pending
    } else {
        PackageState::InTransit
    }
}

#[cfg(test)]
mod tests {
    use super::resolve;
    use crate::models::order::PackageState;

    const DELIVERY_STATUSES: [&str; 4] = [
        "Shipping on time",
        "Late delivery",
        "Advance shipping",
        "Shipping canceled",
    ];

    #[test]
    fn order_status_overrides_delivery_status() {
        assert_eq!(resolve("Shipping on time", "CANCELED"), PackageState::Returned);
        assert_eq!(resolve("Late delivery", "COMPLETE"), PackageState::Delivered);
        assert_eq!(resolve("Shipping canceled", "CLOSED"), PackageState::Delivered);
    }

    #[test]
    fn canceled_shipping_returns_unless_fulfilled() {
        assert_eq!(resolve("Shipping canceled", "PENDING"), PackageState::Returned);
        assert_eq!(resolve("Shipping canceled", "PROCESSING"), PackageState::Returned);
    }

    #[test]
    fn pending_family_resolves_to_pending() {
        for status in ["PENDING", "ON_HOLD", "PAYMENT_REVIEW", "PENDING_PAYMENT"] {
            assert_eq!(resolve("Advance shipping", status), PackageState::Pending);
        }
    }

    #[test]
    fn processing_and_unknown_statuses_are_in_transit() {
        for delivery in DELIVERY_STATUSES.iter().filter(|s| **s != "Shipping canceled") {
            assert_eq!(resolve(delivery, "PROCESSING"), PackageState::InTransit);
            assert_eq!(resolve(delivery, ""), PackageState::InTransit);
            assert_eq!(resolve(delivery, "SOMETHING_NEW"), PackageState::InTransit);
        }
    }

    #[test]
    fn fraud_is_returned_for_every_delivery_status() {
        for delivery in DELIVERY_STATUSES {
            assert_eq!(resolve(delivery, "SUSPECTED_FRAUD"), PackageState::Returned);
        }
    }
}
