//! Status badges as closed enums. Each label type parses leniently with an
//! `Unknown` fallback and maps exhaustively onto a colour tone.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Error,
    Primary,
    Accent,
    Muted,
}

impl Tone {
    /// Solid pill classes (tables).
    pub fn badge_classes(self) -> &'static str {
        match self {
            Tone::Success => "bg-success text-success-foreground",
            Tone::Warning => "bg-warning text-warning-foreground",
            Tone::Error => "bg-error text-error-foreground",
            Tone::Primary => "bg-primary text-primary-foreground",
            Tone::Accent => "bg-accent text-accent-foreground",
            Tone::Muted => "bg-muted text-muted-foreground",
        }
    }

    /// Tinted outline classes (alert cards, audit rows).
    pub fn outline_classes(self) -> &'static str {
        match self {
            Tone::Success => "text-success bg-success/10 border-success/20",
            Tone::Warning => "text-warning bg-warning/10 border-warning/20",
            Tone::Error => "text-error bg-error/10 border-error/20",
            Tone::Primary => "text-primary bg-primary/10 border-primary/20",
            Tone::Accent => "text-accent bg-accent/10 border-accent/20",
            Tone::Muted => "text-muted-foreground bg-muted border-border",
        }
    }
}

fn label_key(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! badge_enum {
    ($name:ident { $($variant:ident => ($($label:literal)|+, $tone:expr)),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
            Unknown,
        }

        impl $name {
            pub fn from_label(label: &str) -> Self {
                let key = label_key(label);
                $(
                    if [$($label),+].iter().any(|l| label_key(l) == key) {
                        return $name::$variant;
                    }
                )+
                $name::Unknown
            }

            pub fn tone(self) -> Tone {
                match self {
                    $($name::$variant => $tone,)+
                    $name::Unknown => Tone::Muted,
                }
            }
        }
    };
}

badge_enum!(CaseStatus {
    Active => ("Active", Tone::Success),
    Pending => ("Pending", Tone::Warning),
    OnHold => ("On Hold", Tone::Muted),
    Completed => ("Completed", Tone::Primary),
    UnderReview => ("Under Review", Tone::Warning),
    Closed => ("Closed", Tone::Muted),
    Critical => ("Critical", Tone::Error),
});

badge_enum!(Priority {
    Critical => ("Critical", Tone::Error),
    High => ("High", Tone::Warning),
    Medium => ("Medium", Tone::Accent),
    Low => ("Low", Tone::Muted),
});

badge_enum!(Severity {
    Critical => ("Critical", Tone::Error),
    High => ("High", Tone::Error),
    Warning => ("Warning", Tone::Warning),
    Medium => ("Medium", Tone::Warning),
    Info => ("Info", Tone::Primary),
    Low => ("Low", Tone::Muted),
});

badge_enum!(UserStatus {
    Active => ("Active", Tone::Success),
    Away => ("Away", Tone::Warning),
    Inactive => ("Inactive", Tone::Muted),
});

badge_enum!(EvidenceStatus {
    Analyzed => ("Analyzed", Tone::Success),
    Processing => ("Processing", Tone::Warning),
    Pending => ("Pending" | "Queued", Tone::Muted),
    Flagged => ("Flagged", Tone::Error),
    Failed => ("Failed", Tone::Error),
});

badge_enum!(AuditStatus {
    Success => ("Success" | "Verified" | "Compliant", Tone::Success),
    Failed => ("Failed", Tone::Error),
    Investigating => ("Investigating", Tone::Error),
    Resolved => ("Resolved", Tone::Success),
    Active => ("Active", Tone::Warning),
    Warning => ("Warning" | "Minor Issues", Tone::Warning),
});

/// Utilisation gauges: red at 80% and above, amber from 60%.
pub fn metric_tone(percent: f64) -> Tone {
    if percent >= 80.0 {
        Tone::Error
    } else if percent >= 60.0 {
        Tone::Warning
    } else {
        Tone::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_leniently() {
        assert_eq!(CaseStatus::from_label("on_hold"), CaseStatus::OnHold);
        assert_eq!(CaseStatus::from_label("On Hold"), CaseStatus::OnHold);
        assert_eq!(CaseStatus::from_label("ACTIVE"), CaseStatus::Active);
        assert_eq!(AuditStatus::from_label("verified"), AuditStatus::Success);
        assert_eq!(CaseStatus::from_label("under_review"), CaseStatus::UnderReview);
        assert_eq!(CaseStatus::from_label("Closed"), CaseStatus::Closed);
        assert_eq!(CaseStatus::from_label("critical"), CaseStatus::Critical);
        assert_eq!(EvidenceStatus::from_label("FAILED"), EvidenceStatus::Failed);
        assert_eq!(AuditStatus::from_label("minor-issues"), AuditStatus::Warning);
        assert_eq!(AuditStatus::from_label("Active"), AuditStatus::Active);
    }

    #[test]
    fn review_and_failure_states_are_coloured() {
        assert_eq!(CaseStatus::UnderReview.tone(), Tone::Warning);
        assert_eq!(CaseStatus::Closed.tone(), Tone::Muted);
        assert_eq!(CaseStatus::Critical.tone(), Tone::Error);
        assert_eq!(EvidenceStatus::Failed.tone(), Tone::Error);
        for label in ["Active", "Warning", "Minor Issues"] {
            assert_eq!(
                AuditStatus::from_label(label).tone().outline_classes(),
                "text-warning bg-warning/10 border-warning/20"
            );
        }
    }

    #[test]
    fn unknown_labels_fall_back_to_muted() {
        let s = Priority::from_label("urgent-ish");
        assert_eq!(s, Priority::Unknown);
        assert_eq!(s.tone(), Tone::Muted);
        assert_eq!(s.tone().badge_classes(), "bg-muted text-muted-foreground");
    }

    #[test]
    fn tones_follow_dashboard_palette() {
        assert_eq!(Priority::Critical.tone(), Tone::Error);
        assert_eq!(CaseStatus::Completed.tone(), Tone::Primary);
        assert_eq!(Severity::Info.tone().outline_classes(), "text-primary bg-primary/10 border-primary/20");
        assert_eq!(metric_tone(85.0), Tone::Error);
        assert_eq!(metric_tone(60.0), Tone::Warning);
        assert_eq!(metric_tone(12.5), Tone::Success);
    }
}
