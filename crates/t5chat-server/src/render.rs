//! Server-rendered chat page.

use std::fmt::Write;

use crate::conversation::{ConversationState, Role};
use crate::feedback::{FeedbackState, Rating};

pub const PAGE_TITLE: &str = "T5 Chat Bot";
pub const HEADING: &str = "T5 Chat Bot 🤖";
pub const INPUT_PLACEHOLDER: &str = "Type your message here...";
pub const RATING_PROMPT: &str = "Rate the response:";
pub const FEEDBACK_LABEL: &str = "Additional feedback:";
pub const FEEDBACK_BUTTON: &str = "Submit Feedback";
pub const FEEDBACK_THANKS: &str = "Thank you for your feedback!";

const STYLE: &str = "\
body{font-family:sans-serif;max-width:48rem;margin:0 auto;padding:1rem}\
.transcript{display:flex;flex-direction:column;gap:.5rem;margin-bottom:1rem}\
.message{padding:.5rem .75rem;border-radius:.5rem;white-space:pre-wrap}\
.message.user{background:#eef2ff;align-self:flex-end}\
.message.assistant{background:#f4f4f5;align-self:flex-start}\
.role{font-size:.75rem;color:#71717a;display:block}\
.notice{background:#fee2e2;color:#991b1b;padding:.5rem .75rem;border-radius:.5rem;margin:.5rem 0}\
.success{background:#dcfce7;color:#166534;padding:.5rem .75rem;border-radius:.5rem;margin:.5rem 0}\
form.chat{display:flex;gap:.5rem}form.chat input{flex:1;padding:.5rem}\
textarea{width:100%;min-height:5rem}";

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the full page for one session.
pub fn render_page(conversation: &ConversationState) -> String {
    let mut html = String::with_capacity(4096);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{PAGE_TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<h1>{HEADING}</h1>\n"
    );

    html.push_str("<div class=\"transcript\">\n");
    for message in conversation.messages() {
        let role = message.role.as_str();
        let _ = writeln!(
            html,
            "<div class=\"message {role}\"><span class=\"role\">{}</span>{}</div>",
            match message.role {
                Role::User => "You",
                Role::Assistant => "Bot",
            },
            escape_html(&message.content)
        );
    }
    html.push_str("</div>\n");

    for notice in conversation.notices() {
        let _ = writeln!(html, "<div class=\"notice\" role=\"alert\">{}</div>", escape_html(notice));
    }

    let _ = writeln!(
        html,
        "<form class=\"chat\" method=\"post\" action=\"/chat\">\
         <input type=\"text\" name=\"message\" placeholder=\"{INPUT_PLACEHOLDER}\" autocomplete=\"off\" autofocus>\
         <button type=\"submit\">Send</button></form>"
    );

    if conversation.feedback_enabled() {
        html.push_str("<hr>\n");
        render_feedback(&mut html, &conversation.feedback);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_feedback(html: &mut String, feedback: &FeedbackState) {
    let _ = write!(
        html,
        "<form class=\"rating\" method=\"post\" action=\"/feedback/rating\">\
         <fieldset><legend>{RATING_PROMPT}</legend>"
    );
    for rating in Rating::ALL {
        let checked = if rating == feedback.rating() { " checked" } else { "" };
        let _ = write!(
            html,
            "<label><input type=\"radio\" name=\"rating\" value=\"{label}\"{checked} \
             onchange=\"this.form.submit()\"> {label}</label> ",
            label = rating.label()
        );
    }
    html.push_str(
        "<noscript><button type=\"submit\">Select</button></noscript></fieldset></form>\n",
    );

    if feedback.elaboration_visible() {
        let _ = writeln!(
            html,
            "<form class=\"feedback\" method=\"post\" action=\"/feedback\">\
             <label for=\"feedback\">{FEEDBACK_LABEL}</label>\
             <textarea id=\"feedback\" name=\"feedback\">{}</textarea>\
             <button type=\"submit\">{FEEDBACK_BUTTON}</button></form>",
            escape_html(feedback.draft())
        );
    }

    if feedback.is_acknowledged() {
        let _ = writeln!(html, "<div class=\"success\">{FEEDBACK_THANKS}</div>");
    }
}
