//! Job list, job detail, and the apply form.

use std::fmt::Write;

use session::SessionUser;

use super::{error_line, escape, page};
use crate::services::jobs::Job;

fn text(field: Option<&str>) -> String {
    field.map(escape).unwrap_or_default()
}

fn job_card(job: &Job) -> String {
    let badge = job
        .job_type
        .as_deref()
        .map(|t| format!(r#" <span class="badge">{}</span>"#, escape(t)))
        .unwrap_or_default();
    let salary = job
        .salary
        .as_deref()
        .map(|s| format!(r#"<p class="success">{}</p>"#, escape(s)))
        .unwrap_or_default();
    format!(
        r#"<div class="card">
  <h3>{title}{badge}</h3>
  <p class="muted">{company}</p>
  <p>{location}</p>
  {salary}
  <a class="button" href="/jobs/{key}">View Details</a>
</div>"#,
        title = text(job.title.as_deref()),
        company = text(job.company.as_deref()),
        location = text(job.location.as_deref()),
        key = escape(job.link_key()),
    )
}

/// Jobs page. `jobs` is already filtered by `term`; `error` replaces the list.
#[must_use]
pub fn jobs_page(viewer: Option<&SessionUser>, jobs: &[&Job], term: &str, error: Option<&str>) -> String {
    let mut body = format!(
        r#"<h1>Find Your Dream Job</h1>
<p class="muted">Explore thousands of job opportunities with all the information you need.</p>
<form method="get" action="/jobs"><input type="text" name="search" value="{term}" placeholder="Job title, keyword, or company"></form>
"#,
        term = escape(term),
    );
    if error.is_some() {
        body.push_str(&error_line(error));
    } else if jobs.is_empty() {
        body.push_str(
            r#"<div class="card"><h3>No Jobs Found</h3><p class="muted">Sorry, we couldn't find any jobs matching your search. Try different keywords.</p></div>"#,
        );
    } else {
        body.push_str(r#"<div class="grid">"#);
        for job in jobs {
            body.push_str(&job_card(job));
        }
        body.push_str("</div>");
    }
    page("Jobs", viewer, &body)
}

#[must_use]
pub fn job_detail_page(viewer: Option<&SessionUser>, job: &Job) -> String {
    let description = job.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("No description available.");
    let body = format!(
        r#"<div class="card">
  <h1>{title}</h1>
  <p class="muted">{company}</p>
  <p class="muted">{location} &bull; {job_type}</p>
  <p class="success">Salary: {salary}</p>
  <h3>Job Description</h3>
  <p style="white-space:pre-line">{description}</p>
  <a class="button" href="/apply/{id}">Apply Now</a>
</div>"#,
        title = text(job.title.as_deref()),
        company = text(job.company.as_deref()),
        location = text(job.location.as_deref()),
        job_type = text(job.job_type.as_deref()),
        salary = text(job.salary.as_deref()),
        description = escape(description),
        id = escape(&job.id),
    );
    page(job.title.as_deref().unwrap_or("Job"), viewer, &body)
}

#[must_use]
pub fn job_not_found_page(viewer: Option<&SessionUser>) -> String {
    page("Job not found", viewer, r#"<div class="card"><p class="error">Job not found.</p></div>"#)
}

/// Apply form; `submitted` swaps the form for a confirmation.
#[must_use]
pub fn apply_page(viewer: &SessionUser, job: &Job, submitted: bool, message: &str, error: Option<&str>) -> String {
    let mut body = format!(
        r#"<div class="card">
  <h1>Apply for {title}</h1>
  <p class="muted">{company}</p>
"#,
        title = text(job.title.as_deref()),
        company = text(job.company.as_deref()),
    );
    if submitted {
        body.push_str(r#"  <p class="success">Application submitted successfully!</p>"#);
    } else {
        body.push_str(&error_line(error));
        let _ = write!(
            body,
            r#"  <form method="post" action="/apply/{id}">
    <textarea name="message" rows="5" placeholder="Write a short message or cover letter..." required>{message}</textarea>
    <button class="button" type="submit">Submit Application</button>
  </form>"#,
            id = escape(&job.id),
            message = escape(message),
        );
    }
    body.push_str("\n</div>");
    page("Apply", Some(viewer), &body)
}
