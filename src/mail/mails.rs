use ammonia::clean_text;

use super::sendmail::EmailMessage;
use crate::{dtos::enquirydtos::EnquiryForm, models::enquirymodel::Enquiry};

fn label(form: &EnquiryForm) -> &'static str {
    match form {
        EnquiryForm::Contact { .. } => "contact enquiry",
        EnquiryForm::Quote { .. } => "quote request",
        EnquiryForm::Ebook {} => "ebook download",
        EnquiryForm::Mporium { .. } => "Mporium enquiry",
    }
}

fn row(html: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        html.push_str(&format!(
            "<tr><td style=\"padding:4px 12px 4px 0;color:#666\">{}</td><td>{}</td></tr>",
            name,
            clean_text(value)
        ));
    }
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        "<div style=\"font-family:Arial,sans-serif;max-width:600px\"><h2>{}</h2>{}</div>",
        heading, body
    )
}

/// Admin alert for a new enquiry. Every user-supplied value is escaped.
pub fn enquiry_alert_email(to: &str, enquiry: &Enquiry, form: &EnquiryForm) -> EmailMessage {
    let mut table = String::from("<table>");
    row(&mut table, "Name", Some(enquiry.name.as_str()));
    row(&mut table, "Email", enquiry.email.as_deref());
    row(&mut table, "Phone", enquiry.phone.as_deref());
    row(&mut table, "Collection", enquiry.collection.map(|c| c.as_str()));

    match form {
        EnquiryForm::Contact {
            preferred_contact, ..
        } => row(&mut table, "Preferred contact", preferred_contact.as_deref()),
        EnquiryForm::Quote {
            estimated_total,
            upgrade_ids,
            ..
        } => {
            let total = estimated_total.map(|t| format!("${:.2}", t));
            row(&mut table, "Estimated total", total.as_deref());
            let upgrades = upgrade_ids.len().to_string();
            row(&mut table, "Upgrades selected", Some(upgrades.as_str()));
        }
        EnquiryForm::Mporium { product, .. } => row(&mut table, "Product", product.as_deref()),
        EnquiryForm::Ebook {} => {}
    }

    row(&mut table, "Message", form.message());
    table.push_str("</table>");

    EmailMessage {
        to: to.to_string(),
        subject: format!("New {} from {}", label(form), enquiry.name.trim()),
        html: layout(&format!("New {}", label(form)), &table),
    }
}

pub fn ebook_email(to: &str, name: &str, pdf_url: &str) -> EmailMessage {
    let body = format!(
        "<p>Hi {},</p><p>Thanks for your interest. Your ebook is ready to download:</p>\
         <p><a href=\"{}\">Download the ebook</a></p>",
        clean_text(name.trim()),
        clean_text(pdf_url)
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Your ebook download".to_string(),
        html: layout("Your ebook", &body),
    }
}
