//! Dashboards, admin lists, post-job form, and the profile page.

use std::fmt::Write;

use session::SessionUser;

use super::{error_line, escape, page};
use crate::services::applications::Application;
use crate::services::jobs::{Job, JobType, NewJob};
use crate::services::users::UserRecord;

/// Dashboard for the legacy `user` role.
#[must_use]
pub fn user_dashboard(viewer: &SessionUser) -> String {
    let body = format!(
        r#"<div class="card"><h1>Welcome, {email}</h1><p class="muted">This is your user dashboard.</p></div>"#,
        email = escape(&viewer.email),
    );
    page("Dashboard", Some(viewer), &body)
}

#[must_use]
pub fn seeker_dashboard(viewer: &SessionUser, applications: &[Application], error: Option<&str>) -> String {
    let mut body = format!(
        r#"<div class="card">
  <h1>Welcome, Job Seeker</h1>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>UID:</strong> {uid}</p>
  <p><strong>Role:</strong> {role}</p>
  <p>Start applying to jobs now! Visit the <a href="/jobs">Jobs Page</a></p>
</div>
<h2>Your Applications</h2>
"#,
        email = escape(&viewer.email),
        uid = escape(&viewer.uid),
        role = viewer.role,
    );
    if error.is_some() {
        body.push_str(&error_line(error));
    } else if applications.is_empty() {
        body.push_str(r#"<p class="muted">You have not applied to any jobs yet.</p>"#);
    } else {
        for application in applications {
            let _ = write!(
                body,
                r#"<div class="card"><h3><a href="/jobs/{id}">{title}</a></h3><p class="muted">{message}</p></div>"#,
                id = escape(&application.job_id),
                title = escape(&application.job_title),
                message = escape(&application.message),
            );
        }
    }
    page("Seeker Dashboard", Some(viewer), &body)
}

#[must_use]
pub fn employer_dashboard(viewer: &SessionUser, postings: &[Job], error: Option<&str>) -> String {
    let mut body = format!(
        r#"<div class="card">
  <h1>Welcome, Employer</h1>
  <p>Logged in as: <strong>{email}</strong></p>
  <p>Ready to post a job? <a href="/dashboard/employer/post-job">Click here to Post a Job</a></p>
</div>
<h2>Your Postings</h2>
"#,
        email = escape(&viewer.email),
    );
    if error.is_some() {
        body.push_str(&error_line(error));
    } else if postings.is_empty() {
        body.push_str(r#"<p class="muted">No jobs posted yet.</p>"#);
    } else {
        for job in postings {
            let _ = write!(
                body,
                r#"<div class="card"><h3><a href="/jobs/{id}">{title}</a></h3><p class="muted">{count} applicant(s)</p></div>"#,
                id = escape(&job.id),
                title = escape(job.title.as_deref().unwrap_or("Untitled")),
                count = job.applicants.len(),
            );
        }
    }
    page("Employer Dashboard", Some(viewer), &body)
}

/// Post-job form. `form` refills the fields after a rejected submission.
#[must_use]
pub fn post_job_page(viewer: &SessionUser, form: &NewJob, success: bool, error: Option<&str>) -> String {
    let options: String = JobType::ALL
        .iter()
        .map(|t| {
            let selected = if t.as_str().eq_ignore_ascii_case(&form.job_type) { " selected" } else { "" };
            format!(r#"<option value="{value}"{selected}>{value}</option>"#, value = t.as_str())
        })
        .collect();
    let notice = if success { r#"<p class="success">Job posted successfully!</p>"# } else { "" };
    let body = format!(
        r#"<div class="card">
  <h1>Post a New Job</h1>
  {notice}
  {error}
  <form method="post" action="/dashboard/employer/post-job">
    <input type="text" name="title" placeholder="Job Title" value="{title}" required>
    <input type="text" name="company" placeholder="Company Name" value="{company}" required>
    <input type="text" name="location" placeholder="Location" value="{location}" required>
    <select name="type">{options}</select>
    <textarea name="description" rows="5" placeholder="Job Description" required>{description}</textarea>
    <button class="button" type="submit">Post Job</button>
  </form>
</div>"#,
        error = error_line(error),
        title = escape(&form.title),
        company = escape(&form.company),
        location = escape(&form.location),
        description = escape(&form.description),
    );
    page("Post a Job", Some(viewer), &body)
}

// =============================================================================
// ADMIN
// =============================================================================

/// Counts are `None` when the listing failed.
#[must_use]
pub fn admin_dashboard(viewer: &SessionUser, counts: Option<(usize, usize, usize)>) -> String {
    let (users, jobs, applications) = counts.map_or_else(
        || ("?".to_owned(), "?".to_owned(), "?".to_owned()),
        |(u, j, a)| (u.to_string(), j.to_string(), a.to_string()),
    );
    let body = format!(
        r#"<h1>Admin Dashboard</h1>
<p>Welcome, <strong>{email}</strong></p>
<p class="muted">Role: {role}</p>
<div class="grid">
  <div class="card"><h3><a href="/dashboard/admin/users">Users</a></h3><p>Manage all users ({users})</p></div>
  <div class="card"><h3><a href="/dashboard/admin/jobs">Jobs</a></h3><p>Manage all job postings ({jobs})</p></div>
  <div class="card"><h3>Reports</h3><p>{applications} application(s) received</p></div>
</div>"#,
        email = escape(&viewer.email),
        role = viewer.role,
    );
    page("Admin Dashboard", Some(viewer), &body)
}

#[must_use]
pub fn admin_users_page(viewer: &SessionUser, users: &[UserRecord], error: Option<&str>) -> String {
    let mut body = String::from("<h1>All Registered Users</h1>\n");
    body.push_str(&error_line(error));
    if error.is_none() && users.is_empty() {
        body.push_str("<p>No users found.</p>");
    }
    for user in users {
        let _ = write!(
            body,
            r#"<div class="card">
  <h3>{name}</h3>
  <p>{email}</p>
  <p class="muted">Role: {role}</p>
  <form method="post" action="/dashboard/admin/users/{id}/delete"><button class="button danger" type="submit">Delete</button></form>
</div>"#,
            name = escape(user.name.as_deref().unwrap_or("Unnamed User")),
            email = escape(user.email.as_deref().unwrap_or_default()),
            role = escape(user.role.as_deref().unwrap_or_default()),
            id = escape(&user.id),
        );
    }
    page("Users", Some(viewer), &body)
}

#[must_use]
pub fn admin_jobs_page(viewer: &SessionUser, jobs: &[Job], error: Option<&str>) -> String {
    let mut body = String::from("<h1>All Job Postings</h1>\n");
    body.push_str(&error_line(error));
    if error.is_none() && jobs.is_empty() {
        body.push_str("<p>No jobs found.</p>");
    }
    for job in jobs {
        let _ = write!(
            body,
            r#"<div class="card">
  <h3>{title}</h3>
  <p>{company} &bull; {location}</p>
  <form method="post" action="/dashboard/admin/jobs/{id}/delete"><button class="button danger" type="submit">Delete</button></form>
</div>"#,
            title = escape(job.title.as_deref().unwrap_or("Untitled")),
            company = escape(job.company.as_deref().unwrap_or_default()),
            location = escape(job.location.as_deref().unwrap_or_default()),
            id = escape(&job.id),
        );
    }
    page("Jobs", Some(viewer), &body)
}

// =============================================================================
// PROFILE
// =============================================================================

#[must_use]
pub fn profile_page(viewer: &SessionUser) -> String {
    let body = format!(
        r#"<div class="card"><h1>Your Profile</h1><p><strong>Email:</strong> {email}</p><p><strong>Role:</strong> {role}</p></div>"#,
        email = escape(&viewer.email),
        role = viewer.role,
    );
    page("Profile", Some(viewer), &body)
}
