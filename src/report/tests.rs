//! Tests for report rendering and trimming

use super::*;
use crate::types::PivotLevels;

fn result(symbol: &str, ret: f64, close: f64, support: Option<f64>) -> PredictionResult {
    PredictionResult {
        symbol: symbol.to_string(),
        predicted_return: ret,
        last_close: close,
        pivot: support.map(|s| PivotLevels {
            support: s,
            resistance: s + 10.0,
        }),
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn config(promo: Option<&str>, max_chars: usize) -> ReportConfig {
    ReportConfig {
        title: "Outlook".to_string(),
        top_n: 5,
        max_chars,
        disclaimer: Some("Not advice.".to_string()),
        promo: promo.map(str::to_string),
    }
}

fn ranking() -> Ranking {
    Ranking {
        discovery: vec![
            result("2317.TW", 0.0123, 105.5, Some(101.2)),
            result("2454.TW", 0.004, 1200.0, None),
        ],
        benchmarks: vec![result("0050.TW", -0.0041, 180.25, Some(175.0))],
    }
}

#[test]
fn test_render_layout() {
    let report = ReportComposer::new(&config(Some("More: https://x.y"), 500)).compose(date(), &ranking());
    let text = report.render();

    assert_eq!(
        text,
        "Outlook 2025-03-03\n\n\
         Top picks (5d)\n\
         1. 2317.TW +1.23% | 105.50 | S 101.2\n\
         2. 2454.TW +0.40% | 1200.00\n\n\
         Benchmarks\n\
         0050.TW -0.41% | 180.25\n\n\
         Not advice.\n\
         More: https://x.y"
    );
}

#[test]
fn test_empty_sections_not_rendered() {
    let ranking = Ranking {
        discovery: vec![],
        benchmarks: vec![result("0050.TW", 0.01, 100.0, None)],
    };
    let text = ReportComposer::new(&config(None, 500)).compose(date(), &ranking).render();
    assert!(!text.contains("Top picks"));
    assert!(text.contains("Benchmarks"));
}

#[test]
fn test_degraded_strips_promo_only() {
    let report = ReportComposer::new(&config(Some("More: https://x.y"), 500)).compose(date(), &ranking());
    let degraded = report.degraded();

    assert!(degraded.promo.is_none());
    assert!(!degraded.render().contains("https://"));
    assert_eq!(degraded.discovery, report.discovery);
    assert_eq!(degraded.disclaimer, report.disclaimer);
    assert!(degraded.char_count() < report.char_count());
}

#[test]
fn test_promo_dropped_before_disclaimer() {
    let full = ReportComposer::new(&config(Some("More: https://x.y"), 500)).compose(date(), &ranking());
    let limit = full.char_count() - 1;

    let trimmed = ReportComposer::new(&config(Some("More: https://x.y"), limit)).compose(date(), &ranking());
    assert!(trimmed.promo.is_none());
    assert!(trimmed.disclaimer.is_some());
    assert_eq!(trimmed.discovery.len(), 2);
}

#[test]
fn test_discovery_trimmed_from_bottom_after_footers() {
    let no_footer = Report {
        disclaimer: None,
        promo: None,
        ..ReportComposer::new(&config(None, 500)).compose(date(), &ranking())
    };
    let limit = no_footer.char_count() - 1;

    let trimmed = ReportComposer::new(&config(Some("promo"), limit)).compose(date(), &ranking());
    assert!(trimmed.promo.is_none());
    assert!(trimmed.disclaimer.is_none());
    assert_eq!(trimmed.discovery.len(), 1);
    assert_eq!(trimmed.discovery[0].symbol, "2317.TW");
    assert_eq!(trimmed.benchmarks.len(), 1);
}

#[test]
fn test_never_exceeds_limit_and_keeps_whole_lines() {
    let discovery: Vec<_> = (0..5)
        .map(|i| result(&format!("LONGSYMBOL{:02}.TW", i), 0.05 - i as f64 * 0.001, 12345.67, Some(12000.0)))
        .collect();
    let benchmarks: Vec<_> = (0..12)
        .map(|i| result(&format!("BENCHMARK{:02}.TW", i), -0.01, 999.99, None))
        .collect();
    let ranking = Ranking { discovery, benchmarks };
    let promo = "Follow for the full daily sheet: https://example.com/report ".repeat(3);

    let untrimmed = Report {
        date: date(),
        title: "Outlook".into(),
        discovery: ranking.discovery.clone(),
        benchmarks: ranking.benchmarks.clone(),
        disclaimer: Some("Not advice.".into()),
        promo: Some(promo.clone()),
        max_chars: 500,
    }
    .render();
    let full_lines: Vec<&str> = untrimmed.lines().collect();

    for limit in [500, 300, 120, 60] {
        let report = ReportComposer::new(&config(Some(&promo), limit)).compose(date(), &ranking);
        let text = report.render();
        assert!(text.chars().count() <= limit, "limit {}", limit);
        for line in text.lines() {
            assert!(full_lines.contains(&line), "partial line {:?}", line);
        }
    }
}

#[test]
fn test_counts_characters_not_bytes() {
    let cfg = ReportConfig {
        title: "台股預測".to_string(),
        ..config(None, 500)
    };
    let report = ReportComposer::new(&cfg).compose(date(), &ranking());
    let text = report.render();
    assert_eq!(report.char_count(), text.chars().count());
    assert!(text.len() > text.chars().count());
}

#[test]
fn test_header_only_is_truncated_to_limit() {
    let cfg = ReportConfig {
        title: "X".repeat(40),
        disclaimer: None,
        ..config(None, 20)
    };
    let report = ReportComposer::new(&cfg).compose(date(), &ranking());
    assert!(report.discovery.is_empty());
    assert!(report.benchmarks.is_empty());
    assert!(report.char_count() <= 20);
}
