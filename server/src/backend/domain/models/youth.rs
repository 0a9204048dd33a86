//! Domain model for a registered youth.
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Youth {
    /// National ID, digits only; primary key and never changed after creation
    pub cedula: String,
    pub full_name: String,
    pub phone: String,
    pub barrio_id: i64,
    pub birth_date: Option<NaiveDate>,
}

/// A youth joined with the name of their barrio
#[derive(Debug, Clone, PartialEq)]
pub struct YouthWithBarrio {
    pub youth: Youth,
    pub barrio_name: Option<String>,
}

/// Search filter shared by the youth listing and the attendance candidate lookup.
///
/// `text` matches the name; `digits` (the digits contained in the query, if
/// any) additionally matches cédula and phone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YouthSearch {
    pub text: Option<String>,
    pub digits: Option<String>,
}

impl YouthSearch {
    pub fn from_query(q: &str) -> Self {
        let text = q.trim();
        if text.is_empty() {
            return Self::default();
        }
        let digits = shared::format::digits_only(text);
        Self {
            text: Some(text.to_string()),
            digits: (!digits.is_empty()).then_some(digits),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }
}
