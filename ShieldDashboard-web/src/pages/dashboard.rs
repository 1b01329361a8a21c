use shield_dashboard_domain::entities::Sex;
use shield_dashboard_domain::forms::{FieldKind, FormField, SleepForm};
use shield_dashboard_domain::page::DashboardSession;
use shield_dashboard_domain::render::{AlertView, DeltaView, MetricCard, ScoreGauge, ScoreView, GAUGE_RADIUS};

use super::{error_banner, escape_html, layout, NavTab};

/// Render the dashboard for one session.
///
/// `notice` overrides the flow's own error, e.g. for a refused submission.
pub fn render_dashboard(session: &DashboardSession, notice: Option<&str>) -> String {
    let flow = &session.score;
    let banner = error_banner(notice.or(flow.error()));

    let results = flow
        .result()
        .map(|score| render_results(&ScoreView::from(score)))
        .unwrap_or_default();

    let content = format!(
        r#"<h1>Dashboard</h1>
{form}
{banner}
{results}"#,
        form = render_form(&session.form, flow.is_busy()),
        banner = banner,
        results = results,
    );

    layout("Dashboard", NavTab::Dashboard, &content)
}

fn render_form(form: &SleepForm, busy: bool) -> String {
    let fields: String = FormField::ALL
        .into_iter()
        .map(|field| render_field(form, field))
        .collect();

    let (disabled, button_text) = if busy {
        (" disabled", "Calculating...")
    } else {
        ("", "Calculate Score")
    };

    format!(
        r#"<form class="dashboard-form" method="post" action="/">
{fields}
<div class="form-actions"><button type="submit"{disabled}>{button_text}</button></div>
</form>"#
    )
}

fn render_field(form: &SleepForm, field: FormField) -> String {
    let name = field.name();
    let value = form.value_text(field);

    let control = match field.kind() {
        FieldKind::Decimal { min, max, step } => format!(
            r#"<input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}">"#,
            value = escape_html(value),
        ),
        FieldKind::Whole { min, max } => format!(
            r#"<input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="1" value="{value}">"#,
            value = escape_html(value),
        ),
        FieldKind::Choice => {
            let current = value.trim().parse::<Sex>().ok();
            let options: String = Sex::ALL
                .into_iter()
                .map(|sex| {
                    format!(
                        r#"<option value="{}"{}>{}</option>"#,
                        sex.as_str(),
                        selected(current == Some(sex)),
                        sex.label()
                    )
                })
                .collect();
            format!(r#"<select id="{name}" name="{name}">{options}</select>"#)
        }
        FieldKind::Flag => {
            let current = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            };
            format!(
                r#"<select id="{name}" name="{name}"><option value=""{}>Select...</option><option value="true"{}>Yes</option><option value="false"{}>No</option></select>"#,
                selected(current.is_none()),
                selected(current == Some(true)),
                selected(current == Some(false)),
            )
        }
    };

    let error = form
        .error(field)
        .map(|message| format!(r#"<div class="field-error">{}</div>"#, escape_html(message)))
        .unwrap_or_default();

    format!(
        r#"<div class="form-field"><label for="{name}">{label}</label>{control}{error}</div>
"#,
        label = escape_html(field.label()),
    )
}

fn selected(yes: bool) -> &'static str {
    if yes {
        " selected"
    } else {
        ""
    }
}

fn render_results(view: &ScoreView) -> String {
    let cards: String = view.cards.iter().map(render_metric_card).collect();

    format!(
        r#"<section class="results">
<div class="dashboard-cards-row">
{gauge}
{delta}
</div>
<div class="metrics-breakdown">
{cards}</div>
{alerts}
</section>"#,
        gauge = render_gauge(&view.gauge),
        delta = render_delta(&view.delta),
        cards = cards,
        alerts = render_alerts(&view.alerts),
    )
}

fn render_gauge(gauge: &ScoreGauge) -> String {
    let color = "#1976d2";
    format!(
        r##"<div class="score-card" style="border-color: {color}">
    <div class="score-label">SHIELD Sleep Score</div>
    <svg class="score-circular" width="90" height="90" viewBox="0 0 90 90">
        <circle cx="45" cy="45" r="{r}" stroke="#e3eaf2" stroke-width="10" fill="none"/>
        <circle cx="45" cy="45" r="{r}" stroke="{color}" stroke-width="10" fill="none" stroke-dasharray="{circumference:.2}" stroke-dashoffset="{offset:.2}" transform="rotate(-90 45 45)"/>
        <text x="50%" y="54%" text-anchor="middle" font-size="1.4rem" fill="{color}" font-weight="bold">{score}</text>
    </svg>
</div>"##,
        r = GAUGE_RADIUS,
        circumference = gauge.circumference(),
        offset = gauge.dash_offset(),
        score = escape_html(&gauge.score_text()),
    )
}

fn render_delta(delta: &DeltaView) -> String {
    format!(
        r#"<div class="delta-card {class}" style="border-color: {color}">
    <div class="delta-label">Bio-Age Delta</div>
    <div class="delta-value" style="color: {color}">{text}</div>
</div>"#,
        class = delta.tier.css_class(),
        color = delta.tier.color(),
        text = escape_html(&delta.text()),
    )
}

fn render_metric_card(card: &MetricCard) -> String {
    let color = if card.is_adverse() { "#d32f2f" } else { "#43a047" };
    let icon = card
        .icon
        .map(|icon| format!(r#"<span class="metric-icon">{}</span> "#, icon))
        .unwrap_or_default();
    let help = card
        .help
        .as_deref()
        .map(|help| format!(r#"<span class="metric-help" title="{}">?</span>"#, escape_html(help)))
        .unwrap_or_default();

    format!(
        r#"<div class="metric-card" data-key="{key}">
    <div class="metric-title">{icon}{label}{help}</div>
    <div class="metric-value">{value}</div>
    <div class="metric-opt">Optimal: {optimal}</div>
    <div class="metric-impact">Impact: <span style="color: {color}">{impact}</span>
        <div class="progress-bar-bg"><div class="progress-bar" style="width: {width:.1}%; background: {color}"></div></div>
    </div>
</div>
"#,
        key = escape_html(&card.key),
        label = escape_html(&card.label),
        value = escape_html(&card.value),
        optimal = escape_html(&card.optimal),
        impact = escape_html(&card.impact_text()),
        width = card.bar_width(),
    )
}

fn render_alerts(alerts: &[AlertView]) -> String {
    if alerts.is_empty() {
        return r#"<div class="alert-list"><p class="no-alerts">No alerts. Great job!</p></div>"#.to_string();
    }

    let items: String = alerts
        .iter()
        .map(|alert| {
            let suggestion = alert
                .suggestion
                .as_deref()
                .map(|text| format!(r#"<div class="alert-suggestion">{}</div>"#, escape_html(text)))
                .unwrap_or_default();
            format!(
                r#"<div class="alert-card" style="border-left: 6px solid {color}">
    <span class="alert-icon">{icon}</span> <span class="alert-message" style="color: {color}">{message}</span>
    {suggestion}
</div>
"#,
                color = alert.color(),
                icon = alert.icon(),
                message = escape_html(&alert.message),
            )
        })
        .collect();

    format!(r#"<div class="alert-list">{}</div>"#, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_dashboard_domain::entities::{Alert, BreakdownValue, MetricBreakdown, ScoreResponse};

    fn score(alerts: Vec<Alert>) -> ScoreResponse {
        ScoreResponse {
            shield_score: 78.0,
            bio_age_delta: 1.4,
            alerts,
            breakdown: [(
                "naps".to_string(),
                MetricBreakdown {
                    value: BreakdownValue::Text("<2>".to_string()),
                    optimal: "none".to_string(),
                    impact: 0.25,
                    label: None,
                    help: None,
                },
            )]
            .into_iter()
            .collect(),
        }
    }

    fn session_with(result: ScoreResponse) -> DashboardSession {
        let mut session = DashboardSession::default();
        let ticket = session.score.begin().unwrap();
        session.score.succeed(ticket, result);
        session
    }

    #[test]
    fn test_initial_page_has_defaults_and_no_results() {
        let html = render_dashboard(&DashboardSession::default(), None);
        assert!(html.contains(r#"name="total_sleep_hours" min="0" max="24" step="0.1" value="6.5""#));
        assert!(html.contains(r#"<option value="male" selected>"#));
        assert!(html.contains("Calculate Score"));
        assert!(!html.contains(r#"class="score-card""#));
        assert!(!html.contains(r#"class="api-error""#));
    }

    #[test]
    fn test_busy_flow_disables_submit() {
        let mut session = DashboardSession::default();
        session.score.begin().unwrap();
        let html = render_dashboard(&session, None);
        assert!(html.contains("<button type=\"submit\" disabled>Calculating...</button>"));
    }

    #[test]
    fn test_results_are_rendered_and_escaped() {
        let html = render_dashboard(&session_with(score(vec![Alert::new("Low REM sleep")])), None);
        assert!(html.contains(">78</text>"));
        assert!(html.contains("+1.4 yrs"));
        assert!(html.contains(r#"class="delta-card delta-unfavorable""#));
        assert!(html.contains(r#"data-key="naps""#));
        assert!(html.contains("&lt;2&gt;"));
        assert!(html.contains("width: 25.0%"));
        assert!(html.contains(r#"<div class="alert-suggestion">"#));
    }

    #[test]
    fn test_empty_alerts_message() {
        let html = render_dashboard(&session_with(score(Vec::new())), None);
        assert!(html.contains("No alerts. Great job!"));
    }

    #[test]
    fn test_notice_is_shown() {
        let html = render_dashboard(&DashboardSession::default(), Some("A submission is already in progress"));
        assert!(html.contains(r#"<div class="api-error" role="alert">A submission is already in progress</div>"#));
    }
}
