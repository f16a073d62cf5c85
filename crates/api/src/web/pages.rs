// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Minimal server-rendered pages. Presentation is deliberately bare: the
//! workflow only needs a form per stage and a flash message slot.

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn flash(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(
            "<p class=\"flash\">{}</p>\n",
            escape_html(message)
        ),
        None => String::new(),
    }
}

pub fn home() -> String {
    layout(
        "Quiz tournament",
        "<h1>Quiz tournament</h1>\n\
         <p>We will teach you to find any information and answer the hardest \
         questions. All you need is a browser search bar and your own wit.</p>\n\
         <p><a href=\"/register-captain\">Register a team</a></p>",
    )
}

pub fn success() -> String {
    layout(
        "Registration complete",
        "<h1>Registration complete!</h1>\n\
         <p>An email with further instructions has been sent to your address. \
         It sometimes lands in spam, so please check that folder too. If you \
         run into problems, contact the feedback channel.</p>",
    )
}

pub fn captain_form(message: Option<&str>) -> String {
    let body = format!(
        "<h1>Captain registration</h1>\n{}\
         <form method=\"post\" action=\"\">\n\
         <label>Username <input name=\"username\" required></label><br>\n\
         <label>Full name <input name=\"full_name\" required></label><br>\n\
         <label>Email <input name=\"email\" type=\"email\" required></label><br>\n\
         <label>Website <input name=\"website\"></label><br>\n\
         <div class=\"h-captcha\"></div>\n\
         <input type=\"hidden\" name=\"g-recaptcha-response\">\n\
         <button type=\"submit\">Continue</button>\n\
         </form>",
        flash(message)
    );
    layout("Captain registration", &body)
}

pub fn team_form(message: Option<&str>) -> String {
    let body = format!(
        "<h1>Create your team</h1>\n{}\
         <form method=\"post\" action=\"\">\n\
         <label>Team name <input name=\"team_name\" required></label><br>\n\
         <label>City <input name=\"team_city\" required></label><br>\n\
         <label>Affiliation <input name=\"team_affiliation\"></label><br>\n\
         <div class=\"h-captcha\"></div>\n\
         <input type=\"hidden\" name=\"g-recaptcha-response\">\n\
         <button type=\"submit\">Continue</button>\n\
         </form>",
        flash(message)
    );
    layout("Create your team", &body)
}

pub fn roster_form(message: Option<&str>) -> String {
    let body = format!(
        "<h1>Enroll your teammates</h1>\n{}\
         <form method=\"post\" action=\"\">\n\
         <label>Email <input name=\"participant_email[]\"></label>\n\
         <label>Full name <input name=\"participant_full_name[]\"></label><br>\n\
         <label>Email <input name=\"participant_email[]\"></label>\n\
         <label>Full name <input name=\"participant_full_name[]\"></label><br>\n\
         <label>Email <input name=\"participant_email[]\"></label>\n\
         <label>Full name <input name=\"participant_full_name[]\"></label><br>\n\
         <label>Email <input name=\"participant_email[]\"></label>\n\
         <label>Full name <input name=\"participant_full_name[]\"></label><br>\n\
         <div class=\"h-captcha\"></div>\n\
         <input type=\"hidden\" name=\"g-recaptcha-response\">\n\
         <button type=\"submit\">Finish registration</button>\n\
         </form>",
        flash(message)
    );
    layout("Enroll your teammates", &body)
}

pub fn error_page(message: &str) -> String {
    layout("Error", &format!("<h1>{}</h1>", escape_html(message)))
}
