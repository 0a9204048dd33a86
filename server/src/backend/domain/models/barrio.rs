//! Domain model for a neighborhood.

#[derive(Debug, Clone, PartialEq)]
pub struct Barrio {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

impl Barrio {
    /// Trim and collapse inner runs of whitespace: `"  San   Roque "` -> `"San Roque"`
    pub fn normalize_name(raw: &str) -> String {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
