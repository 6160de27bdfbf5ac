//! Plain-text invoice rendering.
//!
//! A pure function over the already-fetched order graph, served as
//! `text/plain` from `GET /orders/{id}/invoice`. PDF output is out of
//! scope.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::models::{Address, Order, OrderItem};

const LINE_WIDTH: usize = 72;

/// Render an invoice for an order.
#[must_use]
pub fn render_invoice(order: &Order, items: &[OrderItem], address: &Address) -> String {
    let mut out = String::with_capacity(1024);
    let rule = "=".repeat(LINE_WIDTH);
    let thin = "-".repeat(LINE_WIDTH);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "ATTARA MARKETPLACE - TAX INVOICE");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Invoice for order {}", order.order_number);
    let _ = writeln!(out, "Date: {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Status: {}", order.status);
    let _ = writeln!(out);
    let _ = writeln!(out, "Ship to:");
    let _ = writeln!(out, "  {}", address.full_name);
    let _ = writeln!(out, "  {}", address.line1);
    if let Some(line2) = &address.line2 {
        let _ = writeln!(out, "  {line2}");
    }
    let _ = writeln!(
        out,
        "  {}, {}, {} {}",
        address.city, address.state, address.country, address.zip_code
    );
    let _ = writeln!(out, "  {}", address.phone);
    let _ = writeln!(out);
    let _ = writeln!(out, "{thin}");
    let _ = writeln!(out, "{:<44} {:>5} {:>9} {:>10}", "Item", "Qty", "Unit", "Total");
    let _ = writeln!(out, "{thin}");

    for item in items {
        let name = item.variant_name.as_ref().map_or_else(
            || item.product_name.clone(),
            |variant| format!("{} ({variant})", item.product_name),
        );
        let line_total = item.unit_price * Decimal::from(item.quantity);
        let _ = writeln!(
            out,
            "{:<44} {:>5} {:>9.2} {:>10.2}",
            truncate(&name, 44),
            item.quantity,
            item.unit_price,
            line_total
        );
    }

    let _ = writeln!(out, "{thin}");
    let _ = writeln!(out, "{:>60} {:>10.2}", "Subtotal:", order.subtotal);
    let _ = writeln!(out, "{:>60} {:>10.2}", "Tax (5%):", order.tax);
    let _ = writeln!(out, "{:>60} {:>10.2}", "Shipping:", order.shipping_fee);
    if order.gift_wrapping_fee > Decimal::ZERO {
        let _ = writeln!(out, "{:>60} {:>10.2}", "Gift wrap:", order.gift_wrapping_fee);
    }
    if order.discount > Decimal::ZERO {
        let _ = writeln!(out, "{:>60} -{:>9.2}", "Discount:", order.discount);
    }
    if order.coins_used > 0 {
        let _ = writeln!(
            out,
            "{:>60} -{:>9.2}",
            "Coins used:",
            Decimal::from(order.coins_used)
        );
    }
    let _ = writeln!(out, "{:>60} {:>10.2}", "TOTAL (AED):", order.total);
    let _ = writeln!(out);
    if order.coins_earned > 0 {
        let _ = writeln!(out, "Coins earned with this order: {}", order.coins_earned);
    }
    let _ = writeln!(out, "Payment: {:?} ({:?})", order.payment_method, order.payment_status);
    let _ = writeln!(out, "{rule}");
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use attara_core::{
        AddressId, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
        UserId, VendorId,
    };
    use chrono::Utc;

    fn fixture() -> (Order, Vec<OrderItem>, Address) {
        let order = Order {
            id: OrderId::new(1),
            order_number: "ATR-20260301-AB12".to_owned(),
            user_id: UserId::new(1),
            address_id: AddressId::new(1),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentStatus::Pending,
            subtotal: Decimal::from(200),
            shipping_fee: Decimal::from(25),
            gift_wrapping_fee: Decimal::ZERO,
            discount: Decimal::from(10),
            tax: Decimal::from(10),
            total: Decimal::from(225),
            coins_used: 0,
            coins_earned: 22,
            coupon_id: None,
            tracking_number: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let items = vec![OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: ProductId::new(1),
            variant_id: None,
            vendor_id: VendorId::new(1),
            product_name: "Amber Nights".to_owned(),
            variant_name: None,
            unit_price: Decimal::from(100),
            quantity: 2,
        }];
        let address = Address {
            id: AddressId::new(1),
            user_id: UserId::new(1),
            full_name: "Amina K".to_owned(),
            phone: "+971501234567".to_owned(),
            line1: "12 Palm St".to_owned(),
            line2: None,
            city: "Dubai".to_owned(),
            state: "Dubai".to_owned(),
            country: "AE".to_owned(),
            zip_code: "00000".to_owned(),
            is_default: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        (order, items, address)
    }

    #[test]
    fn test_invoice_contains_order_facts() {
        let (order, items, address) = fixture();
        let text = render_invoice(&order, &items, &address);
        assert!(text.contains("ATR-20260301-AB12"));
        assert!(text.contains("Amber Nights"));
        assert!(text.contains("Amina K"));
        assert!(text.contains("225.00"));
        assert!(text.contains("Coins earned with this order: 22"));
    }

    #[test]
    fn test_invoice_is_deterministic() {
        let (order, items, address) = fixture();
        assert_eq!(
            render_invoice(&order, &items, &address),
            render_invoice(&order, &items, &address)
        );
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("short", 44), "short");
        let long = "x".repeat(60);
        let cut = truncate(&long, 44);
        assert_eq!(cut.chars().count(), 44);
        assert!(cut.ends_with('…'));
    }
}
