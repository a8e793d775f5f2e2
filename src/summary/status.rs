use std::collections::BTreeMap;

use crate::pdf::Color;

/// Lifecycle states a stored document can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Pending,
    Sent,
    Approved,
    Authorized,
    Completed,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Pending,
        Status::Sent,
        Status::Approved,
        Status::Authorized,
        Status::Completed,
        Status::Rejected,
    ];

    /// Case-insensitive English or Spanish name.
    pub fn from_name(name: &str) -> Option<Self> {
        let status = match name.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Status::Pending,
            "sent" | "enviada" | "enviado" => Status::Sent,
            "approved" | "aprobada" | "aprobado" => Status::Approved,
            "authorized" | "autorizada" | "autorizado" => Status::Authorized,
            "completed" | "completada" | "completado" => Status::Completed,
            "rejected" | "rechazada" | "rechazado" => Status::Rejected,
            _ => return None,
        };
        Some(status)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pendiente",
            Status::Sent => "Enviada",
            Status::Approved => "Aprobada",
            Status::Authorized => "Autorizada",
            Status::Completed => "Completada",
            Status::Rejected => "Rechazada",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Status::Pending => Color::rgb(214, 120, 0),
            Status::Sent => Color::rgb(13, 110, 253),
            Status::Approved => Color::rgb(25, 135, 84),
            Status::Authorized => Color::rgb(32, 160, 160),
            Status::Completed => Color::rgb(22, 58, 107),
            Status::Rejected => Color::rgb(200, 35, 51),
        }
    }

    /// Counts toward the approval rate.
    pub fn is_approved(&self) -> bool {
        matches!(
            self,
            Status::Approved | Status::Authorized | Status::Completed
        )
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Chip color for statuses outside the known set.
pub const OTHER_STATUS_COLOR: Color = Color::rgb(108, 117, 125);

/// Shown for records that carry no status at all.
pub const NO_STATUS_LABEL: &str = "(sin estado)";

/// Display text of a status outside the known set.
pub fn unknown_status_label(raw: &str) -> String {
    match raw.trim() {
        "" => NO_STATUS_LABEL.to_string(),
        literal => literal.to_string(),
    }
}

/// Per-status record counts. Known statuses are always present, even at
/// zero; anything else is kept under its literal name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTally {
    known: [usize; 6],
    other: BTreeMap<String, usize>,
}

impl StatusTally {
    pub fn record(&mut self, raw: &str) {
        match Status::from_name(raw) {
            Some(status) => self.known[status.index()] += 1,
            None => {
                let literal = unknown_status_label(raw);
                log::warn!("Unknown status '{literal}', counting it separately");
                *self.other.entry(literal).or_insert(0) += 1;
            }
        }
    }

    pub fn count(&self, status: Status) -> usize {
        self.known[status.index()]
    }

    pub fn other(&self) -> &BTreeMap<String, usize> {
        &self.other
    }

    pub fn total(&self) -> usize {
        self.known.iter().sum::<usize>() + self.other.values().sum::<usize>()
    }

    pub fn approved(&self) -> usize {
        Status::ALL
            .iter()
            .filter(|s| s.is_approved())
            .map(|s| self.count(*s))
            .sum()
    }

    /// Display rows: every known status in order, then the unknown ones.
    pub fn entries(&self) -> Vec<(String, usize, Color)> {
        let known = Status::ALL
            .iter()
            .map(|s| (s.label().to_string(), self.count(*s), s.color()));
        let other = self
            .other
            .iter()
            .map(|(name, count)| (name.clone(), *count, OTHER_STATUS_COLOR));
        known.chain(other).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_and_spanish_names() {
        assert_eq!(Status::from_name("APROBADA"), Some(Status::Approved));
        assert_eq!(Status::from_name(" sent "), Some(Status::Sent));
        assert_eq!(Status::from_name("archived"), None);
    }

    #[test]
    fn unknown_statuses_are_kept_by_literal() {
        let mut tally = StatusTally::default();
        tally.record("pending");
        tally.record("pendiente");
        tally.record("archivada");
        tally.record("");

        assert_eq!(tally.count(Status::Pending), 2);
        assert_eq!(tally.other().get("archivada"), Some(&1));
        assert_eq!(tally.other().get("(sin estado)"), Some(&1));
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn entries_list_every_known_status() {
        let tally = StatusTally::default();
        let entries = tally.entries();
        assert_eq!(entries.len(), Status::ALL.len());
        assert!(entries.iter().all(|(_, count, _)| *count == 0));
    }
}
