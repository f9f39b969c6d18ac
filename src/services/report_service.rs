//! CSV rendering for the admin order report.

use chrono::{SecondsFormat, Utc};

use crate::entity::{orders, users};

pub const CSV_HEADER: [&str; 8] = [
    "OrderID",
    "Date",
    "UserName",
    "UserEmail",
    "Status",
    "Paid",
    "ItemsCount",
    "TotalPrice",
];

fn escape_field(value: &str) -> String {
    let doubled = value.replace('"', "\"\"");
    if doubled.contains(',') || doubled.contains('\n') {
        format!("\"{doubled}\"")
    } else {
        doubled
    }
}

fn render_row<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",")
}

/// Rows are emitted in the order given; lines are joined with `\n`.
pub fn render_orders_csv<'a>(
    rows: impl IntoIterator<Item = (&'a orders::Model, Option<&'a users::Model>)>,
) -> String {
    let mut lines = vec![render_row(CSV_HEADER)];
    for (order, owner) in rows {
        let fields = [
            order.id.to_string(),
            order
                .created_at
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            owner.map(|u| u.name.clone()).unwrap_or_default(),
            owner.map(|u| u.email.clone()).unwrap_or_default(),
            order.status.as_str().to_string(),
            if order.is_paid { "Yes" } else { "No" }.to_string(),
            order.order_items.total_quantity().to_string(),
            order.total_price.to_string(),
        ];
        lines.push(render_row(fields.iter().map(String::as_str)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::order::{OrderDraft, OrderLine, ShippingAddress, new_order},
        entity::json::{IdList, SavedAddresses},
    };
    use chrono::TimeZone;
    use uuid::Uuid;

    fn line(qty: i32) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            name: "Saree".into(),
            image: "saree.jpg".into(),
            price: 50.0,
            qty,
            size: None,
            delivery_charges: 0.0,
        }
    }

    fn order(total: f64) -> orders::Model {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        new_order(
            Uuid::nil(),
            Uuid::new_v4(),
            OrderDraft {
                order_items: vec![line(2), line(1)],
                shipping_address: ShippingAddress {
                    name: "A".into(),
                    phone: "1".into(),
                    address: "x".into(),
                    city: "y".into(),
                    state: "z".into(),
                    pincode: "1".into(),
                },
                payment_method: None,
                items_price: total,
                shipping_price: 0.0,
                total_price: total,
            },
            created,
        )
        .unwrap()
    }

    fn owner(name: &str) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            email: "a@example.com".into(),
            password_hash: String::new(),
            is_admin: false,
            addresses: SavedAddresses::default(),
            wishlist: IdList::default(),
            reset_password_token: None,
            reset_password_expires: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn header_only_when_there_are_no_orders() {
        assert_eq!(
            render_orders_csv(std::iter::empty()),
            "OrderID,Date,UserName,UserEmail,Status,Paid,ItemsCount,TotalPrice"
        );
    }

    #[test]
    fn rows_sum_quantities_and_quote_commas() {
        let order = order(150.0);
        let owner = owner("Rao, Asha \"AR\"");
        let csv = render_orders_csv([(&order, Some(&owner))]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "00000000-0000-0000-0000-000000000000,2024-05-01T10:00:00.000Z,\
             \"Rao, Asha \"\"AR\"\"\",a@example.com,Pending,No,3,150"
        );
    }

    #[test]
    fn missing_owner_leaves_blank_columns() {
        let mut order = order(99.5);
        order.is_paid = true;
        let csv = render_orders_csv([(&order, None)]);
        assert!(csv.lines().nth(1).unwrap().ends_with(",,,Pending,Yes,3,99.5"));
    }

    #[test]
    fn quotes_without_separators_are_doubled_but_unwrapped() {
        assert_eq!(escape_field("say \"hi\""), "say \"\"hi\"\"");
        assert_eq!(escape_field("a\nb"), "\"a\nb\"");
    }
}
