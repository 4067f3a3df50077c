//! Typed records backed by the spreadsheet store.

/// One scheduled padharamani, converted verbatim from a sheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Padharamani {
    /// 1-based sheet row, kept for traceability only.
    pub row_number: usize,
    pub date: String,
    pub beginning_time: String,
    pub ending_time: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub email: String,
    pub phone: String,
    pub transport_volunteer: String,
    pub volunteer_number: String,
    pub comments: String,
    pub zone_coordinator: String,
    pub zone_coordinator_phone: String,
    pub status: String,
}

impl Padharamani {
    /// Convert a raw sheet row. Short rows are padded with empty strings;
    /// a blank status column defaults to "Scheduled".
    pub fn from_row(row_number: usize, row: &[String]) -> Self {
        let col = |i: usize| row.get(i).cloned().unwrap_or_default();
        let status = col(13);
        Self {
            row_number,
            date: col(0),
            beginning_time: col(1),
            ending_time: col(2),
            name: col(3),
            address: col(4),
            city: col(5),
            email: col(6),
            phone: col(7),
            transport_volunteer: col(8),
            volunteer_number: col(9),
            comments: col(10),
            zone_coordinator: col(11),
            zone_coordinator_phone: col(12),
            status: if status.is_empty() {
                "Scheduled".to_string()
            } else {
                status
            },
        }
    }

    /// Matches today's date, is not canceled (any case), and has a subject.
    pub fn is_eligible(&self, today: &str) -> bool {
        self.date == today
            && !self.status.eq_ignore_ascii_case("canceled")
            && !self.name.is_empty()
    }

    /// Sort key for the daily list. An empty beginning time sorts first.
    pub fn sort_time(&self) -> &str {
        if self.beginning_time.is_empty() {
            "00:00"
        } else {
            &self.beginning_time
        }
    }
}

/// A chat registered to receive daily reminders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub chat_id: i64,
    pub name: String,
    pub registration_date: String,
}

impl Recipient {
    /// Convert a raw sheet row. Returns `None` when the chat id column is
    /// empty or not an integer; a missing name falls back to "Unknown".
    pub fn from_row(row: &[String]) -> Option<Self> {
        let chat_id = row.first()?.trim();
        if chat_id.is_empty() {
            return None;
        }
        let chat_id = chat_id.parse().ok()?;
        Some(Self {
            chat_id,
            name: row
                .get(1)
                .filter(|s| !s.is_empty())
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            registration_date: row.get(2).cloned().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn padharamani_pads_short_rows() {
        let p = Padharamani::from_row(2, &row(&["2024-01-05", "10:00"]));
        assert_eq!(p.row_number, 2);
        assert_eq!(p.date, "2024-01-05");
        assert_eq!(p.beginning_time, "10:00");
        assert_eq!(p.name, "");
        assert_eq!(p.status, "Scheduled");
    }

    #[test]
    fn blank_status_defaults_to_scheduled() {
        let mut cells = vec![String::new(); 14];
        cells[13] = "Confirmed".to_string();
        assert_eq!(Padharamani::from_row(2, &cells).status, "Confirmed");
        cells[13].clear();
        assert_eq!(Padharamani::from_row(2, &cells).status, "Scheduled");
    }

    #[test]
    fn eligibility_filters_cancel_date_and_name() {
        let base = Padharamani {
            date: "2024-01-05".to_string(),
            name: "A".to_string(),
            status: "Scheduled".to_string(),
            ..Padharamani::default()
        };
        assert!(base.is_eligible("2024-01-05"));
        assert!(!base.is_eligible("2024-01-06"));

        let canceled =
            Padharamani { status: "CaNcElEd".to_string(), ..base.clone() };
        assert!(!canceled.is_eligible("2024-01-05"));

        let nameless = Padharamani { name: String::new(), ..base };
        assert!(!nameless.is_eligible("2024-01-05"));
    }

    #[test]
    fn empty_beginning_time_sorts_first() {
        let p = Padharamani::default();
        assert_eq!(p.sort_time(), "00:00");
        let p = Padharamani {
            beginning_time: "09:30".to_string(),
            ..Padharamani::default()
        };
        assert_eq!(p.sort_time(), "09:30");
    }

    #[test]
    fn recipient_requires_numeric_chat_id() {
        assert_eq!(Recipient::from_row(&row(&[])), None);
        assert_eq!(Recipient::from_row(&row(&["", "Alice"])), None);
        assert_eq!(Recipient::from_row(&row(&["not-a-number", "Alice"])), None);

        let r =
            Recipient::from_row(&row(&["42", "Alice", "2024-01-05 01:00:00"]))
                .unwrap();
        assert_eq!(r.chat_id, 42);
        assert_eq!(r.name, "Alice");
        assert_eq!(r.registration_date, "2024-01-05 01:00:00");
    }

    #[test]
    fn recipient_name_defaults_to_unknown() {
        let r = Recipient::from_row(&row(&["42"])).unwrap();
        assert_eq!(r.name, "Unknown");
        assert_eq!(r.registration_date, "");
    }
}
