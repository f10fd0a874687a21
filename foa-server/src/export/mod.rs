//! Order and customer exports (XLSX / PDF)

pub mod pdf;
pub mod xlsx;

use shared::error::{AppError, AppResult};
use shared::models::{Customer, Location, Order, Staff};
use std::collections::HashMap;
use thiserror::Error;

use crate::db::{Collection, DocStore};
use crate::money::format_cedis;
use pdf::{PdfFont, PdfTableBuilder};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font error: {0}")]
    Font(String),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        tracing::error!(error = %err, "Export failed");
        AppError::internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

/// Rendered export ready to be sent as an attachment
#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub const ORDER_HEADERS: [&str; 5] = [
    "Order Time",
    "Order Type",
    "Total Price",
    "Customer Name",
    "Delivery Guy Name",
];
pub const CUSTOMER_XLSX_HEADERS: [&str; 5] = ["Name", "Address", "Phone", "Location", "Status"];
pub const CUSTOMER_PDF_HEADERS: [&str; 4] = ["Name", "Address", "Phone", "Status"];

/// One row per order, newest first
pub fn order_rows(orders: &[Order], customers: &[Customer], staff: &[Staff]) -> Vec<Vec<String>> {
    let customer_names: HashMap<&str, String> =
        customers.iter().map(|c| (c.id.as_str(), c.full_name())).collect();
    let staff_names: HashMap<&str, &str> = staff.iter().map(|s| (s.id.as_str(), s.name.as_str())).collect();

    orders
        .iter()
        .map(|o| {
            vec![
                o.order_time.clone(),
                o.order_type.as_str().to_string(),
                format_cedis(o.total_price),
                customer_names
                    .get(o.client_id.as_str())
                    .filter(|n| !n.is_empty())
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                o.delivery_guy
                    .as_deref()
                    .and_then(|id| staff_names.get(id))
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ]
        })
        .collect()
}

fn status_label(active: bool) -> &'static str {
    if active { "Active" } else { "Inactive" }
}

/// Customer rows; `with_location` adds the location column (spreadsheet only)
pub fn customer_rows(customers: &[Customer], locations: &[Location], with_location: bool) -> Vec<Vec<String>> {
    let location_names: HashMap<&str, &str> =
        locations.iter().map(|l| (l.id.as_str(), l.name.as_str())).collect();

    customers
        .iter()
        .map(|c| {
            let mut row = vec![c.full_name(), c.address.clone(), c.contact.clone()];
            if with_location {
                let location = c
                    .location
                    .as_deref()
                    .map(|id| location_names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string()))
                    .unwrap_or_else(|| "N/A".to_string());
                row.push(location);
            }
            row.push(status_label(c.status).to_string());
            row
        })
        .collect()
}

/// `font` is embedded in PDF output when set
pub fn export_orders(store: &DocStore, format: ExportFormat, font: Option<PdfFont>) -> AppResult<ExportFile> {
    let mut orders: Vec<Order> = store.list(Collection::Orders)?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let customers: Vec<Customer> = store.list(Collection::Customers)?;
    let staff: Vec<Staff> = store.list(Collection::Staff)?;
    let rows = order_rows(&orders, &customers, &staff);

    let bytes = match format {
        ExportFormat::Xlsx => xlsx::write_workbook("Orders", &ORDER_HEADERS, &rows)?,
        ExportFormat::Pdf => PdfTableBuilder::new("All Orders")
            .headers(&ORDER_HEADERS)
            .rows(rows)
            .font(font)
            .build(),
    };
    tracing::info!(format = format.extension(), orders = orders.len(), "Orders exported");
    Ok(ExportFile {
        filename: format!("orders.{}", format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

pub fn export_customers(store: &DocStore, format: ExportFormat, font: Option<PdfFont>) -> AppResult<ExportFile> {
    let mut customers: Vec<Customer> = store.list(Collection::Customers)?;
    customers.sort_by_key(|c| c.full_name().to_lowercase());
    let locations: Vec<Location> = store.list(Collection::Locations)?;

    let bytes = match format {
        ExportFormat::Xlsx => {
            let rows = customer_rows(&customers, &locations, true);
            xlsx::write_workbook("Customers", &CUSTOMER_XLSX_HEADERS, &rows)?
        }
        ExportFormat::Pdf => PdfTableBuilder::new("All Customers")
            .headers(&CUSTOMER_PDF_HEADERS)
            .rows(customer_rows(&customers, &locations, false))
            .font(font)
            .build(),
    };
    tracing::info!(format = format.extension(), customers = customers.len(), "Customers exported");
    Ok(ExportFile {
        filename: format!("customers.{}", format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderStatus, OrderType, StaffRole};

    fn customer(id: &str, first: &str, location: Option<&str>, status: bool) -> Customer {
        Customer {
            id: id.into(),
            uid: String::new(),
            first_name: first.into(),
            last_name: "Mensah".into(),
            email: String::new(),
            contact: "0241234567".into(),
            address: "Accra".into(),
            gender: None,
            image_url: None,
            location: location.map(Into::into),
            status,
            created_at: 0,
        }
    }

    fn order(client: &str, guy: Option<&str>) -> Order {
        Order {
            id: "o1".into(),
            orders: vec![],
            subtotal: 30.0,
            delivery_fee: 0.0,
            total_price: 30.0,
            order_type: OrderType::Delivery,
            order_time: "25 July 2024 at 12:00:00 UTC+00:00".into(),
            other_information: String::new(),
            client_id: client.into(),
            location: None,
            delivery_guy: guy.map(Into::into),
            token: None,
            claimed: None,
            status: OrderStatus::Pending,
            payment_reference: String::new(),
            created_at: 0,
        }
    }

    #[test]
    fn order_rows_fall_back_for_missing_people() {
        let customers = vec![customer("c1", "Ama", None, true)];
        let staff = vec![Staff {
            id: "d1".into(),
            uid: String::new(),
            email: String::new(),
            name: "Kwame".into(),
            phone: String::new(),
            address: String::new(),
            role: StaffRole::DeliveryGuy,
            location: None,
            image: None,
            status: true,
            created_at: 0,
        }];
        let rows = order_rows(&[order("c1", Some("d1")), order("gone", None)], &customers, &staff);
        assert_eq!(rows[0], vec![
            "25 July 2024 at 12:00:00 UTC+00:00",
            "delivery",
            "GH₵ 30.00",
            "Ama Mensah",
            "Kwame"
        ]);
        assert_eq!(rows[1][3], "Unknown");
        assert_eq!(rows[1][4], "N/A");
    }

    #[test]
    fn customer_pdf_rows_skip_location() {
        let locations = vec![Location {
            id: "l1".into(),
            name: "Legon".into(),
            price: 5.0,
            status: true,
            created_at: 0,
        }];
        let customers = vec![customer("c1", "Ama", Some("l1"), true), customer("c2", "Kofi", None, false)];
        let xlsx_rows = customer_rows(&customers, &locations, true);
        assert_eq!(xlsx_rows[0], vec!["Ama Mensah", "Accra", "0241234567", "Legon", "Active"]);
        assert_eq!(xlsx_rows[1][3], "N/A");
        assert_eq!(xlsx_rows[1][4], "Inactive");

        let pdf_rows = customer_rows(&customers, &locations, false);
        assert_eq!(pdf_rows[0].len(), CUSTOMER_PDF_HEADERS.len());
    }

    #[test]
    fn export_files_are_named_by_format() {
        let store = DocStore::open_in_memory().unwrap();
        let file = export_orders(&store, ExportFormat::Xlsx, None).unwrap();
        assert_eq!(file.filename, "orders.xlsx");
        assert_eq!(&file.bytes[..2], b"PK");

        let file = export_customers(&store, ExportFormat::Pdf, None).unwrap();
        assert_eq!(file.filename, "customers.pdf");
        assert_eq!(file.content_type, "application/pdf");
        assert!(file.bytes.starts_with(b"%PDF-"));
        assert_eq!(ExportFormat::parse("XLSX"), Some(ExportFormat::Xlsx));
        assert_eq!(ExportFormat::parse("csv"), None);
    }
}
