//! Vetting notification template: subject + HTML body with `{{TOKEN}}`
//! placeholders and `{{#if_selected}}` / `{{#if_not_selected}}` blocks.
//!
//! The backend performs the real substitution when it sends the emails. The
//! rendering here exists only for the approver's preview pane.

use serde::{Deserialize, Serialize};

pub const PLACEHOLDERS: [&str; 6] = [
    "PARTICIPANT_NAME",
    "PARTICIPANT_EMAIL",
    "EVENT_TITLE",
    "EVENT_LOCATION",
    "EVENT_DATE_RANGE",
    "REGISTRATION_LINK",
];

const SELECTED_BLOCK: &str = "if_selected";
const NOT_SELECTED_BLOCK: &str = "if_not_selected";

pub const DEFAULT_SUBJECT: &str = "Event Selection Results - {{EVENT_TITLE}}";

pub const DEFAULT_BODY: &str = "Dear {{PARTICIPANT_NAME}},

We have completed the selection process for {{EVENT_TITLE}}.

{{#if_selected}}
<strong>Congratulations! You have been selected to participate.</strong>

Event Details:
• Event: {{EVENT_TITLE}}
• Location: {{EVENT_LOCATION}}
• Date: {{EVENT_DATE_RANGE}}

Next Steps:
1. Complete your travel and accommodation details: {{REGISTRATION_LINK}}
2. Download the mobile app
3. Login using your work email ({{PARTICIPANT_EMAIL}})
4. Accept the invitation from the app notifications
5. Submit required documents through the mobile app

We look forward to your participation!
{{/if_selected}}

{{#if_not_selected}}
Thank you for your interest in participating in {{EVENT_TITLE}}.

After careful consideration, we regret to inform you that you have not been selected for this event. Due to limited capacity and specific requirements, we were unable to accommodate all applicants.

We encourage you to apply for future events and appreciate your continued engagement with our programs.
{{/if_not_selected}}

Best regards,
The Event Organization Team";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl EmailTemplate {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self { subject: subject.into(), body: body.into() }
    }

    /// Built-in template used when the tenant has none stored.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_SUBJECT, DEFAULT_BODY)
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Render subject and body for one recipient.
    pub fn render(&self, values: &PlaceholderValues, selected: bool) -> EmailTemplate {
        EmailTemplate {
            subject: substitute(&resolve_blocks(&self.subject, selected), values),
            body: substitute(&resolve_blocks(&self.body, selected), values),
        }
    }

    /// Known placeholder names that occur in subject or body, in declaration order.
    pub fn used_placeholders(&self) -> Vec<&'static str> {
        PLACEHOLDERS
            .into_iter()
            .filter(|name| {
                let token = format!("{{{{{name}}}}}");
                self.subject.contains(&token) || self.body.contains(&token)
            })
            .collect()
    }
}

/// Values substituted into a template preview.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderValues {
    pub participant_name: String,
    pub participant_email: String,
    pub event_title: String,
    pub event_location: String,
    pub event_date_range: String,
    pub registration_link: String,
}

impl PlaceholderValues {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "PARTICIPANT_NAME" => Some(&self.participant_name),
            "PARTICIPANT_EMAIL" => Some(&self.participant_email),
            "EVENT_TITLE" => Some(&self.event_title),
            "EVENT_LOCATION" => Some(&self.event_location),
            "EVENT_DATE_RANGE" => Some(&self.event_date_range),
            "REGISTRATION_LINK" => Some(&self.registration_link),
            _ => None,
        }
    }
}

/// Keep the inner text of the block matching `selected`, drop the other one.
/// An unterminated block is left untouched.
fn resolve_blocks(text: &str, selected: bool) -> String {
    let (keep, drop) = if selected {
        (SELECTED_BLOCK, NOT_SELECTED_BLOCK)
    } else {
        (NOT_SELECTED_BLOCK, SELECTED_BLOCK)
    };
    let without_dropped = rewrite_block(text, drop, false);
    rewrite_block(&without_dropped, keep, true)
}

fn rewrite_block(text: &str, name: &str, keep_inner: bool) -> String {
    let open = format!("{{{{#{name}}}}}");
    let close = format!("{{{{/{name}}}}}");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(&open) {
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(&close) else {
            break;
        };
        out.push_str(&rest[..start]);
        if keep_inner {
            out.push_str(&after_open[..end]);
        }
        rest = &after_open[end + close.len()..];
    }
    out.push_str(rest);
    out
}

fn substitute(text: &str, values: &PlaceholderValues) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 2..];
        match candidate.find("}}") {
            Some(end) => match values.lookup(&candidate[..end]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &candidate[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = candidate;
                }
            },
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
