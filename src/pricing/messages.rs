//! Localized page strings and the WhatsApp deep-link.

use crate::types::Lang;

pub const PRICE_UNAVAILABLE: &str = "Price unavailable";
pub const ORDER_VIA_WHATSAPP: &str = "Order via WhatsApp";
pub const SELECT_GRADE_ON_PRODUCT_PAGE: &str = "Select size/grade on the product page to order";

pub fn price_depends_on_grade(lang: Lang) -> &'static str {
    match lang {
        Lang::En => "Price depends on grade",
        Lang::Bn => "মূল্য গ্রেড-এর উপর নির্ভর করে",
    }
}

/// Message prefilled by the order link before any grade is chosen.
pub fn base_order_message(lang: Lang, title: &str) -> String {
    match lang {
        Lang::En => format!("Hello, I want to order {title}. Please share today's price and availability."),
        Lang::Bn => format!("হ্যালো, আমি {title} অর্ডার করতে চাই। দয়া করে আজকের দাম ও স্টক জানান।"),
    }
}

/// Message prefilled once the grade handler owns the link.
pub fn grade_order_message(lang: Lang, title: &str, grade: Option<&str>) -> String {
    let grade = grade.filter(|g| !g.is_empty());
    match lang {
        Lang::En => {
            let mut msg = format!("Hello, I would like to order {title}");
            if let Some(g) = grade {
                msg.push_str(&format!(" — Size: {g}"));
            }
            msg.push_str(". Please share today's price and availability.");
            msg
        }
        Lang::Bn => {
            let mut msg = format!("হ্যালো, আমি {title} অর্ডার করতে চাই");
            if let Some(g) = grade {
                msg.push_str(&format!(" — সাইজ: {g}"));
            }
            msg.push_str("। দয়া করে আজকের দাম ও স্টক জানান।");
            msg
        }
    }
}

pub fn weight_label(lang: Lang, weight: &str) -> String {
    match lang {
        Lang::En => format!("Weight: {weight}"),
        Lang::Bn => format!("ওজন: {weight}"),
    }
}

pub fn no_results(lang: Lang, query: &str) -> String {
    match lang {
        Lang::En => format!("No results found for \"{query}\"."),
        Lang::Bn => format!("\"{query}\" এর জন্য কোনো ফলাফল পাওয়া যায়নি।"),
    }
}

/// Builds `<endpoint>/send?phone=<phone>&text=<message>` links.
#[derive(Debug, Clone)]
pub struct OrderLinks {
    endpoint: String,
    phone: String,
}

impl OrderLinks {
    pub fn new(endpoint: &str, phone: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            phone: phone.to_string(),
        }
    }

    pub fn href(&self, message: &str) -> String {
        format!(
            "{}/send?phone={}&text={}",
            self.endpoint,
            self.phone,
            urlencoding::encode(message)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_message_includes_size_only_when_selected() {
        assert_eq!(
            grade_order_message(Lang::En, "Mud Crab", Some("L")),
            "Hello, I would like to order Mud Crab — Size: L. Please share today's price and availability."
        );
        assert_eq!(
            grade_order_message(Lang::En, "Mud Crab", Some("")),
            "Hello, I would like to order Mud Crab. Please share today's price and availability."
        );
        assert!(grade_order_message(Lang::Bn, "কাঁকড়া", Some("L")).contains("সাইজ: L"));
    }

    #[test]
    fn href_encodes_message() {
        let links = OrderLinks::new("https://api.whatsapp.com/", "918016216344");
        let href = links.href("Hello, I want to order Mud Crab.");
        assert!(href.starts_with("https://api.whatsapp.com/send?phone=918016216344&text="));
        let text = href.split("&text=").nth(1).unwrap();
        assert!(!text.contains(' '));
        assert_eq!(urlencoding::decode(text).unwrap(), "Hello, I want to order Mud Crab.");
    }
}
