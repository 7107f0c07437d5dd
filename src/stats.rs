use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StatsError {
    #[error("{label} score {value} is outside 0..=1")]
    OutOfRange { label: &'static str, value: f64 },
}

/// Aggregated sentiment proportions for a video's comments. A score may be
/// NaN when the analysis produced nothing for that label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    #[serde(default = "nan")]
    pub positive: f64,
    #[serde(default = "nan")]
    pub neutral: f64,
    #[serde(default = "nan")]
    pub negative: f64,
}

fn nan() -> f64 {
    f64::NAN
}

/// One classifier output: a label and its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Body of a `statsComputed` event: either finished proportions or the raw
/// per-comment analyses, which are reduced with [`SentimentScores::aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsPayload {
    Analyses { analyses: Vec<LabelScore> },
    Scores(SentimentScores),
}

impl StatsPayload {
    pub fn into_scores(self) -> SentimentScores {
        match self {
            StatsPayload::Analyses { analyses } => SentimentScores::aggregate(&analyses),
            StatsPayload::Scores(scores) => scores,
        }
    }
}

impl SentimentScores {
    pub fn validate(&self) -> Result<(), StatsError> {
        for (label, value) in self.labelled() {
            if !value.is_nan() && !(0.0..=1.0).contains(&value) {
                return Err(StatsError::OutOfRange { label, value });
            }
        }
        Ok(())
    }

    pub fn labelled(&self) -> [(&'static str, f64); 3] {
        [
            ("Positive", self.positive),
            ("Neutral", self.neutral),
            ("Negative", self.negative),
        ]
    }

    /// Sums the confidence per label across all analyses and normalises by
    /// the grand total. Labels never seen stay NaN; unknown labels still
    /// count towards the total.
    pub fn aggregate(analyses: &[LabelScore]) -> Self {
        let mut positive = None;
        let mut neutral = None;
        let mut negative = None;
        let mut total = 0.0;

        for analysis in analyses {
            total += analysis.score;
            let slot = match analysis.label.to_ascii_lowercase().as_str() {
                "positive" => &mut positive,
                "neutral" => &mut neutral,
                "negative" => &mut negative,
                _ => continue,
            };
            *slot.get_or_insert(0.0) += analysis.score;
        }

        let proportion = |sum: Option<f64>| match sum {
            Some(sum) if total > 0.0 => sum / total,
            _ => f64::NAN,
        };

        Self {
            positive: proportion(positive),
            neutral: proportion(neutral),
            negative: proportion(negative),
        }
    }
}

/// `0.4567` -> `45.7%`; NaN -> `--`.
pub fn percent_label(value: f64) -> String {
    if value.is_nan() {
        "--".to_string()
    } else {
        format!("{:.1}%", value * 100.0)
    }
}
