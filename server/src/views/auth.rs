//! Login and register forms.

use session::Role;

use super::{error_line, escape, page, role_options};

/// What to pre-fill and report when a form is (re)rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthForm<'a> {
    pub email: &'a str,
    pub error: Option<&'a str>,
    /// Google OAuth client id; `None` hides the Google button.
    pub google_client_id: Option<&'a str>,
}

#[must_use]
pub fn login_page(form: &AuthForm<'_>) -> String {
    let body = format!(
        r#"<div class="card">
  <h1>Login to JobVerse</h1>
  {error}
  <form method="post" action="/auth/login">
    <input type="email" name="email" placeholder="Email" value="{email}" required>
    <input type="password" name="password" placeholder="Password" required>
    <button class="button" type="submit">Login</button>
  </form>
  {google}
  <p class="muted">Don't have an account? <a href="/auth/register">Register</a></p>
</div>"#,
        error = error_line(form.error),
        email = escape(form.email),
        google = google_button(form.google_client_id, "login"),
    );
    page("Login", None, &body)
}

#[must_use]
pub fn register_page(form: &AuthForm<'_>, role: Role) -> String {
    let body = format!(
        r#"<div class="card">
  <h1>Create an Account</h1>
  {error}
  <form method="post" action="/auth/register">
    <input type="email" name="email" placeholder="Email" value="{email}" required>
    <input type="password" name="password" placeholder="Password" required>
    <fieldset>{roles}</fieldset>
    <button class="button" type="submit">Register</button>
  </form>
  {google}
  <p class="muted">Already have an account? <a href="/auth/login">Login</a></p>
</div>"#,
        error = error_line(form.error),
        email = escape(form.email),
        roles = role_options(role),
        google = google_button(form.google_client_id, "register"),
    );
    page("Register", None, &body)
}

/// Google Identity Services button that posts its credential back to `/auth/google`.
fn google_button(client_id: Option<&str>, intent: &str) -> String {
    let Some(client_id) = client_id else {
        return String::new();
    };
    format!(
        r#"<script src="https://accounts.google.com/gsi/client" async></script>
  <div id="g_id_onload" data-client_id="{client}" data-login_uri="/auth/google?intent={intent}" data-ux_mode="redirect" data-auto_prompt="false"></div>
  <div class="g_id_signin" data-type="standard" data-text="continue_with"></div>"#,
        client = escape(client_id),
    )
}
