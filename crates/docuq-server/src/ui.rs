//! Server-rendered HTML for the question form.

use docuq_types::{QaRecord, SessionContext};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub const PAGE_TITLE: &str = "DocuQ: Interactive PDF Questioning";

/// A status line shown above the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

/// Everything one render of the page needs.
pub struct PageView<'a> {
    pub session: &'a SessionContext,
    pub notice: Option<Notice>,
    pub question: Option<&'a str>,
    pub answer: Option<&'a str>,
    pub show_log: bool,
    pub log: &'a [QaRecord],
}

impl<'a> PageView<'a> {
    pub fn new(session: &'a SessionContext) -> Self {
        Self {
            session,
            notice: None,
            question: None,
            answer: None,
            show_log: false,
            log: &[],
        }
    }
}

pub fn render_page(view: &PageView) -> String {
    let identity = match view.session.state.user_name() {
        None => r#"<form method="post" action="/identify">
<label>Enter your name to begin <input type="text" name="name" autofocus></label>
<button type="submit">Start</button>
</form>"#
            .to_string(),
        Some(name) => format!(
            r#"<p class="user">Current User: <code>{}</code></p>
<form method="post" action="/switch-user"><button type="submit">Switch User</button></form>"#,
            encode_text(name)
        ),
    };

    // Inputs stay visible while anonymous but cannot submit
    let disabled = if view.session.state.is_identified() {
        ""
    } else {
        " disabled"
    };

    let notice = view.notice.as_ref().map(render_notice).unwrap_or_default();

    let answer = view
        .answer
        .map(|a| {
            format!(
                r#"<section class="answer"><h2>Answer:</h2><div class="content">{}</div></section>"#,
                encode_text(a)
            )
        })
        .unwrap_or_default();

    let log_toggle = if view.show_log {
        r#"<a href="/">Hide Q&amp;A Log</a>"#
    } else {
        r#"<a href="/?show_log=true">Show Q&amp;A Log</a>"#
    };

    let keep_log = if view.show_log {
        r#"<input type="hidden" name="show_log" value="true">"#
    } else {
        ""
    };

    let log = if view.show_log {
        render_log(view.log)
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; }}
.notice {{ padding: 0.6rem 1rem; border-radius: 6px; margin: 1rem 0; }}
.success {{ background: #e6f4ea; }}
.info {{ background: #e8f0fe; }}
.error {{ background: #fce8e6; }}
.content {{ white-space: pre-wrap; line-height: 1.5; }}
.entry blockquote {{ border-left: 3px solid #ccc; margin: 0.4rem 0; padding-left: 0.8rem; }}
</style>
</head>
<body>
<h1>{title}</h1>
{identity}
<form method="post" action="/ask" enctype="multipart/form-data">
<p><label>Upload a PDF <input type="file" name="file" accept=".pdf,application/pdf"{disabled}></label></p>
<p><label>Enter your question about the PDF <input type="text" name="question" size="60" value="{question}"{disabled}></label></p>
{keep_log}<button type="submit"{disabled}>Ask</button>
</form>
{notice}
{answer}
<p>{log_toggle}</p>
{log}
</body>
</html>"#,
        title = PAGE_TITLE,
        identity = identity,
        question = encode_double_quoted_attribute(view.question.unwrap_or_default()),
        disabled = disabled,
        keep_log = keep_log,
        notice = notice,
        answer = answer,
        log_toggle = log_toggle,
        log = log,
    )
}

fn render_notice(notice: &Notice) -> String {
    let (class, text) = match notice {
        Notice::Success(t) => ("success", t),
        Notice::Info(t) => ("info", t),
        Notice::Error(t) => ("error", t),
    };
    format!(
        r#"<div class="notice {}">{}</div>"#,
        class,
        encode_text(text)
    )
}

fn render_log(rows: &[QaRecord]) -> String {
    if rows.is_empty() {
        return r#"<section class="log"><p>No questions logged yet.</p></section>"#.to_string();
    }
    let entries = rows
        .iter()
        .map(|r| {
            format!(
                r#"<div class="entry"><strong>{}</strong> asked:<blockquote>{}</blockquote><strong>Answer:</strong> <span class="content">{}</span></div>
<hr>"#,
                encode_text(&r.name),
                encode_text(&r.question),
                encode_text(&r.answer),
            )
        })
        .collect::<String>();
    format!(r#"<section class="log">{}</section>"#, entries)
}
