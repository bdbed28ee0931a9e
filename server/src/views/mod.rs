//! Server-rendered HTML.
//!
//! DESIGN
//! ======
//! Every page is a body fragment wrapped in `templates/layout.html`. Fragments
//! are built with `format!`; anything that came from a user or the store goes
//! through [`escape`] first. Views never touch the store or the auth context:
//! handlers pass in exactly what gets rendered.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod auth;
pub mod dashboard;
pub mod jobs;

use std::fmt::Write;

use session::{Role, Route, SessionUser};

const LAYOUT_TEMPLATE: &str = include_str!("../../templates/layout.html");

/// Seconds before the loading placeholder asks the browser to try again.
pub const PLACEHOLDER_REFRESH_SECS: u32 = 1;

/// HTML-escape text for element content and quoted attribute values.
///
/// Braces are escaped too so stored text can never form a layout placeholder.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a body fragment in the site layout.
#[must_use]
pub fn page(title: &str, viewer: Option<&SessionUser>, body: &str) -> String {
    render(title, "", &navbar(viewer), body)
}

fn render(title: &str, head: &str, nav: &str, body: &str) -> String {
    LAYOUT_TEMPLATE
        .replace("{{HEAD}}", head)
        .replace("{{TITLE}}", &escape(title))
        .replace("{{NAV}}", nav)
        .replace("{{BODY}}", body)
}

/// Top navigation. Signed-in viewers get their role's dashboard and a logout button.
#[must_use]
pub fn navbar(viewer: Option<&SessionUser>) -> String {
    let mut nav = String::from(
        r#"<nav><a class="brand" href="/">JobVerse</a><a href="/">Home</a><a href="/jobs">Jobs</a>"#,
    );
    match viewer {
        Some(user) => {
            let _ = write!(
                nav,
                r#"<a href="{}">Dashboard</a><a href="{}">Profile</a><form method="post" action="/auth/logout"><button type="submit">Logout</button></form>"#,
                Route::dashboard_for(user.role).path(),
                Route::Profile.path(),
            );
        }
        None => {
            let _ = write!(nav, r#"<a href="{}">Login</a>"#, Route::Login.path());
        }
    }
    nav.push_str("</nav>");
    nav
}

/// Shown while the viewer's profile is still being looked up. Refreshes itself
/// instead of redirecting, so a slow lookup never bounces an entitled viewer.
#[must_use]
pub fn placeholder_page() -> String {
    render(
        "Loading",
        &format!(r#"<meta http-equiv="refresh" content="{PLACEHOLDER_REFRESH_SECS}">"#),
        &navbar(None),
        r#"<div class="card"><p class="muted">Loading...</p></div>"#,
    )
}

/// Inline red error line, or nothing.
#[must_use]
pub fn error_line(message: Option<&str>) -> String {
    message.map(|m| format!(r#"<p class="error">{}</p>"#, escape(m))).unwrap_or_default()
}

/// Role option list for the register form, seeker first.
#[must_use]
pub fn role_options(selected: Role) -> String {
    Role::SELF_SERVICE
        .iter()
        .map(|role| {
            let checked = if *role == selected { " checked" } else { "" };
            format!(
                r#"<label><input type="radio" name="role" value="{value}"{checked}> {label}</label>"#,
                value = role.as_str(),
                label = role.label(),
            )
        })
        .collect()
}

// =============================================================================
// HOME
// =============================================================================

#[must_use]
pub fn home_page(viewer: Option<&SessionUser>) -> String {
    let body = r#"<section class="card" style="text-align:center">
  <h1>Your Next Career Move Starts Here.</h1>
  <p class="muted">Discover thousands of job opportunities from top companies and find the one that's right for you.</p>
  <form method="get" action="/jobs">
    <input type="text" name="search" placeholder="Job title, keyword, or company">
    <button class="button" type="submit">Search</button>
  </form>
</section>"#;
    page("Home", viewer, body)
}
