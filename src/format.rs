//! Render padharamanis into bounded Telegram HTML messages.

use std::fmt::Write;

use chrono::NaiveDate;
use teloxide::utils::html::escape;

use crate::models::Padharamani;

/// Conservative sub-limit of Telegram's 4096-character message cap,
/// leaving headroom for markup and overhead.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Render `events` (already filtered and sorted) into one or more messages,
/// greedily packed so no message exceeds `limit` characters. The date
/// header appears once, in the first message only.
///
/// Callers short-circuit on an empty event list; this is never invoked
/// with one.
pub fn format_messages(
    events: &[Padharamani],
    today: NaiveDate,
    limit: usize,
) -> Vec<String> {
    let header = format!(
        "📅 <b>Padharamani Reminders - {}</b>\n\n",
        today.format("%A, %B %d, %Y")
    );

    let mut messages = Vec::new();
    let mut current = header;
    let mut current_len = current.chars().count();

    for (i, event) in events.iter().enumerate() {
        let block = format_event(event, i + 1);
        let block_len = block.chars().count();
        if current_len + block_len > limit {
            messages.push(current);
            current = block;
            current_len = block_len;
        } else {
            current.push_str(&block);
            current_len += block_len;
        }
    }

    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

/// One padharamani as an HTML block, terminated by a blank line.
fn format_event(p: &Padharamani, index: usize) -> String {
    let mut out = format!("<b>{index}. {}</b>\n", escape(&p.name));

    // Time cells are free-form text, not validated clock values.
    match (p.beginning_time.as_str(), p.ending_time.as_str()) {
        ("", _) => {}
        (begin, "") => {
            writeln!(out, "⏰ Time: From {}", escape(begin)).unwrap();
        }
        (begin, end) => {
            writeln!(out, "⏰ Time: {} - {}", escape(begin), escape(end))
                .unwrap();
        }
    }

    if !p.phone.is_empty() {
        writeln!(out, "📞 Phone: {}", tel_link(&p.phone)).unwrap();
    }

    if !p.address.is_empty() {
        if p.city.is_empty() {
            writeln!(out, "📍 Address: {}", escape(&p.address)).unwrap();
        } else {
            let location = format!("{}, {}", p.address, p.city);
            writeln!(
                out,
                "📍 Address: <a href=\"{}\">{}</a>",
                maps_url(&location),
                escape(&location)
            )
            .unwrap();
        }
    }

    if !p.transport_volunteer.is_empty() {
        write!(out, "🚗 Volunteer: {}", escape(&p.transport_volunteer))
            .unwrap();
        if !p.volunteer_number.is_empty() {
            write!(out, " ({})", tel_link(&p.volunteer_number)).unwrap();
        }
        out.push('\n');
    }

    if !p.comments.is_empty() {
        writeln!(out, "💬 Comments: {}", escape(&p.comments)).unwrap();
    }

    out.push('\n');
    out
}

fn tel_link(phone: &str) -> String {
    format!("<a href=\"tel:{}\">{}</a>", attr_url(phone), escape(phone))
}

fn maps_url(location: &str) -> String {
    format!(
        "https://www.google.com/maps/search/{}",
        attr_url(&location.replace(' ', "+").replace(',', "%2C"))
    )
}

/// Percent-encode the characters that would break out of a double-quoted
/// href value. `escape` leaves both untouched.
fn attr_url(value: &str) -> String {
    value.replace('&', "%26").replace('"', "%22")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn event(name: &str) -> Padharamani {
        Padharamani { name: name.to_string(), ..Padharamani::default() }
    }

    #[test]
    fn single_event_fits_in_one_message() {
        let events = [Padharamani {
            name: "A".to_string(),
            beginning_time: "14:00".to_string(),
            ending_time: "15:00".to_string(),
            phone: "555".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            ..Padharamani::default()
        }];
        let messages = format_messages(&events, today(), MAX_MESSAGE_CHARS);
        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert!(msg.contains("Padharamani Reminders - Friday, January 05, 2024"));
        assert!(msg.contains("<b>1. A</b>"));
        assert!(msg.contains("⏰ Time: 14:00 - 15:00"));
        assert!(msg.contains("<a href=\"tel:555\">555</a>"));
        assert!(msg.contains(
            "https://www.google.com/maps/search/1+Main+St%2C+Springfield"
        ));
        assert!(msg.contains(">1 Main St, Springfield</a>"));
    }

    #[test]
    fn begin_only_renders_from_line_and_no_time_omits_it() {
        let from_only = Padharamani {
            name: "A".to_string(),
            beginning_time: "14:00".to_string(),
            ..Padharamani::default()
        };
        let block = format_event(&from_only, 1);
        assert!(block.contains("⏰ Time: From 14:00"));

        let block = format_event(&event("A"), 1);
        assert!(!block.contains("⏰"));
    }

    #[test]
    fn address_without_city_has_no_link() {
        let p = Padharamani {
            name: "A".to_string(),
            address: "1 Main St".to_string(),
            ..Padharamani::default()
        };
        let block = format_event(&p, 1);
        assert!(block.contains("📍 Address: 1 Main St\n"));
        assert!(!block.contains("maps"));
    }

    #[test]
    fn volunteer_phone_is_parenthesized_link() {
        let p = Padharamani {
            name: "A".to_string(),
            transport_volunteer: "Bob".to_string(),
            volunteer_number: "777".to_string(),
            ..Padharamani::default()
        };
        let block = format_event(&p, 1);
        assert!(block.contains("🚗 Volunteer: Bob (<a href=\"tel:777\">777</a>)"));
    }

    #[test]
    fn user_text_is_html_escaped() {
        let p = Padharamani {
            name: "A <b>& sons".to_string(),
            beginning_time: "2pm <ish>".to_string(),
            ending_time: "4pm".to_string(),
            comments: "x < y".to_string(),
            ..Padharamani::default()
        };
        let block = format_event(&p, 3);
        assert!(block.contains("<b>3. A &lt;b&gt;&amp; sons</b>"));
        assert!(block.contains("⏰ Time: 2pm &lt;ish&gt; - 4pm"));
        assert!(!block.contains("<ish>"));
        assert!(block.contains("💬 Comments: x &lt; y"));
    }

    #[test]
    fn free_form_begin_time_is_escaped_in_from_line() {
        let p = Padharamani {
            name: "A".to_string(),
            beginning_time: "after <noon>".to_string(),
            ..Padharamani::default()
        };
        let block = format_event(&p, 1);
        assert!(block.contains("⏰ Time: From after &lt;noon&gt;"));
    }

    #[test]
    fn quotes_cannot_break_out_of_href_attributes() {
        let p = Padharamani {
            name: "A".to_string(),
            phone: "555\" onclick=\"x".to_string(),
            address: "1 \"Main\" St".to_string(),
            city: "B&B Corner".to_string(),
            ..Padharamani::default()
        };
        let block = format_event(&p, 1);
        assert!(block.contains("href=\"tel:555%22 onclick=%22x\""));
        assert!(block.contains(
            "https://www.google.com/maps/search/1+%22Main%22+St%2C+B%26B+Corner"
        ));
        // The visible text still uses entity escaping.
        assert!(block.contains(">1 \"Main\" St, B&amp;B Corner</a>"));
    }

    #[test]
    fn every_block_appears_once_across_messages() {
        // ~200-character blocks against a 4000-character limit must spill
        // into multiple messages without losing or duplicating a block.
        let events: Vec<_> = (0..50)
            .map(|i| Padharamani {
                name: format!("Family {i}"),
                comments: "c".repeat(160),
                ..Padharamani::default()
            })
            .collect();
        let messages = format_messages(&events, today(), MAX_MESSAGE_CHARS);
        assert!(messages.len() > 1);
        for msg in &messages {
            assert!(msg.chars().count() <= MAX_MESSAGE_CHARS);
        }
        let all = messages.concat();
        for (i, event) in events.iter().enumerate() {
            let title = format!("<b>{}. {}</b>", i + 1, event.name);
            assert_eq!(all.matches(&title).count(), 1, "missing {title}");
        }
        // Header only in the first message.
        assert_eq!(all.matches("Padharamani Reminders").count(), 1);
        assert!(messages[0].starts_with("📅"));
    }

    #[test]
    fn content_under_limit_yields_exactly_one_message() {
        let events = [event("A"), event("B"), event("C")];
        let messages = format_messages(&events, today(), MAX_MESSAGE_CHARS);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn limit_is_measured_in_characters_not_bytes() {
        // Multi-byte names: a byte-measured limit would split earlier.
        let events: Vec<_> =
            (0..4).map(|_| event(&"🙏".repeat(20))).collect();
        let block_len = format_event(&events[0], 1).chars().count();
        let header_len = format_messages(&events[..1], today(), usize::MAX)[0]
            .chars()
            .count()
            - block_len;
        // Limit fits header plus exactly two blocks.
        let limit = header_len + 2 * block_len + 4;
        let messages = format_messages(&events, today(), limit);
        assert_eq!(messages.len(), 2);
    }
}
