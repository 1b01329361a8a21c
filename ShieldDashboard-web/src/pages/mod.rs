//! Server-rendered HTML pages

pub mod dashboard;
pub mod lab_report;

/// Which navigation link is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTab {
    Dashboard,
    LabReport,
}

/// Escape text for use in HTML bodies and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Error banner, or nothing
pub fn error_banner(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(
            r#"<div class="api-error" role="alert">{}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

/// Wrap page content in the shared shell
pub fn layout(title: &str, active: NavTab, content: &str) -> String {
    let link_class = |tab: NavTab| if tab == active { "active" } else { "" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | SHIELD Longevity</title>
    <style>{style}</style>
</head>
<body>
<nav class="navbar">
    <div class="navbar-logo">SHIELD Longevity</div>
    <div class="navbar-links">
        <a href="/" class="{dashboard_class}">Dashboard</a>
        <a href="/lab-report" class="{lab_class}">Lab Report</a>
    </div>
</nav>
<main class="page">
{content}
</main>
</body>
</html>"#,
        title = escape_html(title),
        style = STYLE,
        dashboard_class = link_class(NavTab::Dashboard),
        lab_class = link_class(NavTab::LabReport),
        content = content,
    )
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f8fc; color: #1e2a50; }
.navbar { display: flex; justify-content: space-between; align-items: center; padding: 12px 24px; background: #1976d2; color: #fff; }
.navbar-logo { font-weight: 700; font-size: 1.2rem; }
.navbar-links a { color: #fff; margin-left: 18px; text-decoration: none; opacity: 0.8; }
.navbar-links a.active { opacity: 1; font-weight: 700; border-bottom: 2px solid #fff; }
.page { max-width: 980px; margin: 0 auto; padding: 24px; }
.dashboard-form, .lab-form { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 14px; background: #fff; padding: 18px; border-radius: 10px; }
.form-field label { display: block; font-weight: 600; margin-bottom: 4px; }
.form-field input, .form-field select { width: 100%; padding: 6px; box-sizing: border-box; }
.field-error { color: #d32f2f; font-size: 0.9rem; margin-top: 3px; }
.api-error { background: #fdecea; color: #d32f2f; padding: 10px 14px; border-radius: 8px; margin: 14px 0; }
button[disabled] { opacity: 0.6; cursor: not-allowed; }
.dashboard-cards-row { display: flex; gap: 18px; margin: 22px 0; }
.score-card, .delta-card { background: #fff; border: 2px solid; border-radius: 12px; padding: 16px 22px; text-align: center; }
.delta-value { font-size: 2rem; font-weight: 700; }
.metrics-breakdown { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 14px; }
.metric-card, .biomarker-card { background: #fff; border-radius: 10px; padding: 14px; box-shadow: 0 2px 8px rgba(30,42,80,0.08); }
.metric-title { font-weight: 700; }
.metric-help { margin-left: 6px; cursor: help; color: #1976d2; }
.progress-bar-bg { background: #e3eaf2; border-radius: 4px; height: 8px; margin-top: 6px; }
.progress-bar { height: 8px; border-radius: 4px; }
.alert-list { margin-top: 22px; }
.alert-card { background: #fff; border-radius: 10px; padding: 14px 18px; margin-bottom: 14px; }
.alert-suggestion { margin: 6px 0 0 32px; background: #f1f8e9; color: #388e3c; border-radius: 7px; padding: 8px 12px; font-style: italic; }
.biomarker-list { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 12px; }
.biomarker-chart { background: #fff; border-radius: 10px; padding: 14px; margin-top: 18px; }
.chart-row { display: flex; align-items: center; gap: 10px; margin: 6px 0; }
.chart-label { width: 180px; font-size: 0.9rem; }
.chart-bar { background: #1976d2; height: 14px; border-radius: 3px; }
.lab-suggestions { background: #f1f8e9; border-radius: 10px; padding: 14px; margin-top: 18px; white-space: pre-line; }
"#;
