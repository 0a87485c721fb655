use std::fmt;

use chrono::NaiveDate;

/// Subscription plan of a customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Free,
    Pro,
    Business,
}

impl Plan {
    pub fn label(self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Pro => "Pro",
            Plan::Business => "Business",
        }
    }

    /// Case-insensitive parse of the wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "free" => Some(Plan::Free),
            "pro" => Some(Plan::Pro),
            "business" => Some(Plan::Business),
            _ => None,
        }
    }
}

/// Account lifecycle status of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Trial,
    Churned,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Trial => "Trial",
            Status::Churned => "Churned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(Status::Active),
            "trial" => Some(Status::Trial),
            "churned" => Some(Status::Churned),
            _ => None,
        }
    }
}

/// Signup date as delivered on the wire.
///
/// Unparsable values are kept verbatim instead of failing the whole
/// load: they render as-is and order before every valid date, equal to
/// each other, so the stable sort keeps their incoming order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupDate {
    Valid(NaiveDate),
    Invalid(String),
}

impl SignupDate {
    /// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return SignupDate::Valid(date);
        }
        if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(trimmed) {
            return SignupDate::Valid(datetime.date_naive());
        }
        SignupDate::Invalid(value.to_string())
    }

    /// Sort key: `None` orders before every `Some`, which is exactly
    /// the sentinel ordering we want for invalid dates.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            SignupDate::Valid(date) => Some(*date),
            SignupDate::Invalid(_) => None,
        }
    }

    /// Wire form, used when copying rows out of the table.
    pub fn iso(&self) -> String {
        match self {
            SignupDate::Valid(date) => date.format("%Y-%m-%d").to_string(),
            SignupDate::Invalid(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for SignupDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignupDate::Valid(date) => write!(f, "{}", date.format("%d %b %Y")),
            SignupDate::Invalid(raw) => write!(f, "{raw}"),
        }
    }
}

/// One customer account, rendered as one table row.
///
/// `id` is unique within a dataset and is used for row identity only;
/// it is never displayed and never searched.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: Plan,
    pub status: Status,
    pub signup_date: SignupDate,
    pub spend: f64,
}

/// Formats a non-negative amount as USD with thousands grouping.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let dollars = cents / 100;
    let rem = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.{rem:02}")
}
