use crate::form::PredictionForm;
use attrition::prediction::record::{
    JOB_SATISFACTION_RANGE, MAX_AGE, MAX_YEARS_AT_COMPANY, MONTHLY_INCOME_STEP,
};
use attrition::prediction::{Department, Label, MaritalStatus, Overtime, Prediction};
use std::fmt::Write;

/// Which view the shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Page {
    Home,
    AttritionPrediction,
}

/// Result panel shown beneath the prediction form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Verdict(Prediction),
    /// Invalid input or an inference failure; the form stays usable.
    Failed(String),
}

/// Everything `render` needs for one response. Built per request, never shared.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UiState {
    pub(crate) page: Page,
    pub(crate) form: PredictionForm,
    pub(crate) outcome: Option<Outcome>,
    /// Set when the artifacts could not be loaded; replaces the form.
    pub(crate) unavailable: Option<String>,
}

impl UiState {
    pub(crate) fn home() -> Self {
        Self {
            page: Page::Home,
            form: PredictionForm::default(),
            outcome: None,
            unavailable: None,
        }
    }

    pub(crate) fn prediction(form: PredictionForm, outcome: Option<Outcome>) -> Self {
        Self {
            page: Page::AttritionPrediction,
            form,
            outcome,
            unavailable: None,
        }
    }

    pub(crate) fn unavailable(message: String) -> Self {
        Self {
            page: Page::AttritionPrediction,
            form: PredictionForm::default(),
            outcome: None,
            unavailable: Some(message),
        }
    }
}

pub(crate) fn render(state: &UiState) -> String {
    let mut body = String::new();
    match state.page {
        Page::Home => render_home(&mut body),
        Page::AttritionPrediction => render_prediction(&mut body, state),
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Employee Analytics Dashboard</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n{nav}\n<main>\n{body}</main>\n</body>\n</html>\n",
        nav = render_nav(state.page),
    )
}

const STYLE: &str = "body{font-family:sans-serif;display:flex;margin:0}\
nav{width:12rem;padding:1rem;background:#f0f2f6;min-height:100vh}\
nav a{display:block;margin:.5rem 0}nav a.active{font-weight:bold}\
main{padding:2rem;max-width:40rem}label{display:block;margin-top:.75rem}\
.success{background:#e6f4ea;padding:1rem}.error{background:#fdecea;padding:1rem}\
.warning{background:#fff4e5;padding:1rem}";

fn render_nav(page: Page) -> String {
    let link = |href: &str, title: &str, current: bool| {
        let class = if current { " class=\"active\"" } else { "" };
        format!("<a href=\"{href}\"{class}>{title}</a>")
    };
    format!(
        "<nav>\n<h2>Navigation</h2>\n{}\n{}\n</nav>",
        link("/", "Home", page == Page::Home),
        link(
            "/attrition",
            "Attrition Prediction",
            page == Page::AttritionPrediction
        ),
    )
}

fn render_home(out: &mut String) {
    out.push_str(
        "<h1 style=\"text-align:center\">Employee Analytics Dashboard</h1>\n\
         <p style=\"text-align:center\">Empowering HR teams with AI-driven insights</p>\n\
         <hr>\n\
         <h3>What You Can Do</h3>\n<ul>\n\
         <li><strong>Attrition Prediction</strong>: predict whether an employee is likely to \
         leave the company using key attributes like age, salary, tenure, and more.</li>\n\
         <li><strong>AI-Powered Insights</strong>: understand workforce trends to reduce \
         turnover and boost retention.</li>\n\
         <li><strong>HR Decision Support</strong>: make informed HR decisions with the help of \
         machine learning models.</li>\n</ul>\n\
         <p>Use the navigation to get started.</p>\n",
    );
}

fn render_prediction(out: &mut String, state: &UiState) {
    out.push_str("<h1>Employee Attrition Prediction</h1>\n");

    if let Some(message) = &state.unavailable {
        let _ = writeln!(
            out,
            "<div class=\"error\">Predictions are unavailable: {}</div>",
            escape(message)
        );
        return;
    }

    out.push_str(
        "<p>Enter employee details to predict the likelihood of attrition.</p>\n\
         <form method=\"post\" action=\"/attrition\">\n",
    );

    let form = &state.form;
    number_input(out, "age", "Age", &form.age, 0, MAX_AGE, 1);
    number_input(
        out,
        "monthly_income",
        "Monthly Income",
        &form.monthly_income,
        0,
        u32::MAX,
        MONTHLY_INCOME_STEP,
    );
    number_input(
        out,
        "years_at_company",
        "Years at Company",
        &form.years_at_company,
        0,
        MAX_YEARS_AT_COMPANY,
        1,
    );
    number_input(
        out,
        "job_satisfaction",
        "Job Satisfaction (1 to 4)",
        &form.job_satisfaction,
        JOB_SATISFACTION_RANGE.0,
        JOB_SATISFACTION_RANGE.1,
        1,
    );

    select(
        out,
        "department",
        "Department",
        &form.department,
        Department::ALL.map(Department::label),
    );
    select(
        out,
        "marital_status",
        "Marital Status",
        &form.marital_status,
        MaritalStatus::ALL.map(MaritalStatus::label),
    );
    select(
        out,
        "overtime",
        "Overtime",
        &form.overtime,
        Overtime::ALL.map(Overtime::label),
    );

    out.push_str("<p><button type=\"submit\">Predict Attrition</button></p>\n</form>\n");

    match &state.outcome {
        Some(Outcome::Verdict(prediction)) => render_verdict(out, prediction),
        Some(Outcome::Failed(message)) => {
            let _ = writeln!(
                out,
                "<div class=\"warning\">Error: {}</div>",
                escape(message)
            );
        }
        None => {}
    }
}

fn render_verdict(out: &mut String, prediction: &Prediction) {
    let class = match prediction.label {
        Label::Leave => "error",
        Label::Stay => "success",
    };
    let _ = write!(
        out,
        "<div class=\"{class}\" data-label=\"{}\">{}",
        prediction.label,
        prediction.label.message()
    );
    if let Some(probability) = prediction.leave_probability {
        let _ = write!(
            out,
            " <small>(leave probability {:.1}%)</small>",
            probability * 100.0
        );
    }
    out.push_str("</div>\n");
}

fn number_input(
    out: &mut String,
    name: &str,
    title: &str,
    value: &str,
    min: u32,
    max: u32,
    step: u32,
) {
    let max_attr = if max == u32::MAX {
        String::new()
    } else {
        format!(" max=\"{max}\"")
    };
    let _ = writeln!(
        out,
        "<label>{title} <input type=\"number\" name=\"{name}\" value=\"{}\" \
         min=\"{min}\"{max_attr} step=\"{step}\" required></label>",
        escape(value)
    );
}

fn select<const N: usize>(
    out: &mut String,
    name: &str,
    title: &str,
    current: &str,
    options: [&str; N],
) {
    let _ = write!(out, "<label>{title} <select name=\"{name}\">");
    for option in options {
        let selected = if option.eq_ignore_ascii_case(current.trim()) {
            " selected"
        } else {
            ""
        };
        let escaped = escape(option);
        let _ = write!(out, "<option value=\"{escaped}\"{selected}>{escaped}</option>");
    }
    out.push_str("</select></label>\n");
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
