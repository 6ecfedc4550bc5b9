//! CSV export of an event's registrations.

use persistence::entities::RegistrationDetailEntity;

const HEADER: &str = "Ticket Code,Email,Name,Registration Date,Status,Attended";

/// Escapes one CSV field: always quoted, embedded quotes doubled.
fn escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Renders registrations as CSV, one data row per registration.
pub fn registrations_to_csv(registrations: &[RegistrationDetailEntity]) -> String {
    let mut out = String::from(HEADER);
    out.push_str("\r\n");

    for reg in registrations {
        let status: domain::models::RegistrationStatus = reg.status.into();
        let row = [
            escape(&reg.ticket_code),
            escape(&reg.participant_email),
            escape(&reg.participant_name()),
            escape(&reg.registered_at.to_rfc3339()),
            escape(status.as_str()),
            escape(if reg.attended { "yes" } else { "no" }),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }

    out
}

/// File name for the export attachment, derived from the event name.
pub fn export_filename(event_name: &str) -> String {
    let slug: String = event_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        "registrations.csv".to_string()
    } else {
        format!("{}-registrations.csv", slug)
    }
}
