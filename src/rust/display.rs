//! Plain-text rendering of predictions and evaluation reports.

use std::fmt::Write;

use crate::classifier::{EmotionScore, Prediction};
use crate::evaluation::EvaluationReport;

/// Width of the longest emotion title
const LABEL_WIDTH: usize = 8;

/// Renders a proportional bar; values outside `[0, 1]` are clamped.
fn render_bar(value: f64, width: usize) -> String {
    let ratio = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn format_scores(scores: &[EmotionScore]) -> String {
    scores
        .iter()
        .map(|s| format!("{} ({:.1}%)", s.emotion.title(), s.probability * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Headline plus one bar per label, most likely first.
///
/// ```
/// # use limbic::{Emotion, EmotionScore, Prediction};
/// let prediction = Prediction {
///     emotion: Emotion::Joy,
///     confidence: 0.75,
///     probabilities: vec![
///         EmotionScore { emotion: Emotion::Sadness, probability: 0.25 },
///         EmotionScore { emotion: Emotion::Joy, probability: 0.75 },
///     ],
///     normalized_text: "happy".into(),
/// };
/// let text = limbic::render_prediction(&prediction, 20);
/// assert!(text.starts_with("Predicted Emotion: Joy (75.0% confidence)"));
/// ```
pub fn render_prediction(prediction: &Prediction, width: usize) -> String {
    let mut out = format!(
        "Predicted Emotion: {} ({:.1}% confidence)\n",
        prediction.emotion.title(),
        prediction.confidence_pct()
    );
    for score in prediction.ranked() {
        let _ = writeln!(
            out,
            "  {:<w$} {} {:>5.1}%",
            score.emotion.title(),
            render_bar(score.probability, width),
            score.probability * 100.0,
            w = LABEL_WIDTH
        );
    }
    out
}

/// Multi-section summary of an evaluation run.
pub fn render_report(report: &EvaluationReport) -> String {
    let mut out = String::new();

    for category in &report.categories {
        let _ = writeln!(
            out,
            "{:<w$} {}/{} = {:.1}%",
            category.emotion.title(),
            category.correct,
            category.total,
            category.accuracy() * 100.0,
            w = LABEL_WIDTH
        );
        for miss in &category.misses {
            let _ = writeln!(
                out,
                "  missed: {:?} predicted {} ({:.1}%); top: {}",
                miss.sentence,
                miss.predicted.title(),
                miss.confidence * 100.0,
                format_scores(&miss.top)
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total correct predictions: {}/{}", report.correct(), report.total());
    let _ = writeln!(out, "Overall accuracy: {:.1}%", report.overall_accuracy() * 100.0);
    let _ = writeln!(
        out,
        "Average category accuracy: {:.1}%",
        report.average_category_accuracy() * 100.0
    );

    let _ = writeln!(out, "\nMixed sentences:");
    for (i, mixed) in report.mixed.iter().enumerate() {
        let _ = writeln!(out, "{:2}. {}", i + 1, mixed.sentence);
        let _ = writeln!(out, "    Top 3: {}", format_scores(&mixed.top));
    }

    let _ = writeln!(out, "\nNeutral sentence distribution:");
    let total = report.neutral_total().max(1) as f64;
    for (emotion, count) in &report.neutral {
        let _ = writeln!(
            out,
            "  {:<w$} {} sentences ({:.1}%)",
            emotion.title(),
            count,
            *count as f64 / total * 100.0,
            w = LABEL_WIDTH
        );
    }
    out
}
