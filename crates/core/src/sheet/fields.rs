use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    GasLevel,
    Urgency,
    BudgetMode,
    EarlyMeeting,
    Origin,
    Destination,
}

impl Field {
    /// Accepted header spellings, in lookup priority order. Headers are compared lower-cased.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Date => &["date", "day"],
            Self::GasLevel => &["gas level", "gas_level", "gas"],
            Self::Urgency => &["urgency", "urgent", "time to leave"],
            Self::BudgetMode => &["budget mode", "budget_mode", "budget"],
            Self::EarlyMeeting => &["early meeting", "early_meeting", "meeting", "early"],
            Self::Origin => &["origin", "start", "from"],
            Self::Destination => &["destination", "end", "to"],
        }
    }
}

/// Normalized header name -> column index.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut columns = HashMap::new();
        for (idx, raw) in headers.into_iter().enumerate() {
            // Later duplicates win, matching a plain key/value overwrite.
            columns.insert(normalize_header(raw), idx);
        }
        Self { columns }
    }

    /// Column of the first alias present in the header row, even if that column is blank.
    pub fn column(&self, field: Field) -> Option<usize> {
        field
            .aliases()
            .iter()
            .find_map(|alias| self.columns.get(*alias).copied())
    }
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace('"', "")
}
