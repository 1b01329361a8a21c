use shield_dashboard_domain::entities::BiomarkerReport;
use shield_dashboard_domain::page::LabSession;
use shield_dashboard_domain::render::{biomarker_rows, BiomarkerRow};

use super::{error_banner, escape_html, layout, NavTab};

pub fn render_lab_report(session: &LabSession, notice: Option<&str>) -> String {
    let flow = &session.report;

    let (disabled, button_text) = if flow.is_busy() {
        (" disabled", "Uploading...")
    } else {
        ("", "Upload")
    };

    let selected = session
        .file_name
        .as_deref()
        .map(|name| format!(r#"<div class="selected-file">Selected: {}</div>"#, escape_html(name)))
        .unwrap_or_default();

    let results = flow.result().map(render_report).unwrap_or_default();

    let content = format!(
        r#"<h1>Lab Report Upload</h1>
<form class="lab-form" method="post" action="/lab-report" enctype="multipart/form-data">
    <div class="form-field">
        <label for="file">Lab report (PDF)</label>
        <input type="file" id="file" name="file" accept="application/pdf">
        {selected}
    </div>
    <div class="form-actions"><button type="submit"{disabled}>{button_text}</button></div>
</form>
{banner}
{results}"#,
        banner = error_banner(notice.or(flow.error())),
    );

    layout("Lab Report", NavTab::LabReport, &content)
}

fn render_report(report: &BiomarkerReport) -> String {
    let rows = biomarker_rows(report);

    let message = report
        .message
        .as_deref()
        .map(|text| format!(r#"<p class="lab-message">{}</p>"#, escape_html(text)))
        .unwrap_or_default();

    let suggestions = report
        .suggestions
        .as_deref()
        .map(|text| {
            format!(
                r#"<div class="lab-suggestions"><h3>Suggestions</h3>{}</div>"#,
                escape_html(text)
            )
        })
        .unwrap_or_default();

    if rows.is_empty() {
        return format!(
            r#"<section class="lab-results">{message}<p>No biomarkers were found in this report.</p>{suggestions}</section>"#
        );
    }

    let cards: String = rows.iter().map(render_card).collect();
    let bars: String = rows.iter().map(render_bar).collect();

    format!(
        r#"<section class="lab-results">
{message}
<h3>Extracted Biomarkers</h3>
<div class="biomarker-list">
{cards}</div>
<div class="biomarker-chart">
{bars}</div>
{suggestions}
</section>"#
    )
}

fn render_card(row: &BiomarkerRow) -> String {
    let reference = if row.reference_range.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="biomarker-ref">Ref: {}</div>"#, escape_html(&row.reference_range))
    };
    let status = if row.status.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="biomarker-status">{}</div>"#, escape_html(&row.status))
    };

    format!(
        r#"<div class="biomarker-card">
    <div class="biomarker-name">{name}</div>
    <div class="biomarker-value">{value} {unit}</div>
    {reference}{status}
</div>
"#,
        name = escape_html(&row.name),
        value = row.value,
        unit = escape_html(&row.unit),
    )
}

fn render_bar(row: &BiomarkerRow) -> String {
    format!(
        r#"<div class="chart-row"><span class="chart-label">{name}</span><div class="chart-bar" style="width: {width:.1}%"></div><span class="chart-value">{value}</span></div>
"#,
        name = escape_html(&row.name),
        width = row.bar_percent,
        value = row.value,
    )
}
