use crate::registry::FormatKind;
use crate::row::FieldValue;

pub const ABSENT: &str = "-";

/// Render one cell. Absent or non-numeric values in numeric columns render as `-`.
pub fn format_value(kind: FormatKind, value: Option<FieldValue<'_>>) -> String {
    let Some(value) = value else {
        return ABSENT.to_string();
    };
    if kind == FormatKind::Verbatim {
        return match value {
            FieldValue::Text(s) => s.to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{n:.0}"),
            FieldValue::Number(n) => n.to_string(),
        };
    }
    let Some(n) = value.as_number() else {
        return ABSENT.to_string();
    };
    match kind {
        FormatKind::Integer => {
            // Keep `-0.4` from printing as "-0".
            let rounded = n.round();
            format!("{:.0}", if rounded == 0.0 { 0.0 } else { rounded })
        }
        FormatKind::OneDecimal | FormatKind::CumulativeOneDecimal => format!("{n:.1}"),
        FormatKind::TwoDecimal => format!("{n:.2}"),
        FormatKind::PercentOneDecimal => format!("{:.1}%", n * 100.0),
        FormatKind::SignedPercentage => format!("{:+.1}%", n * 100.0),
        FormatKind::SignedRating => format!("{n:+.2}"),
        FormatKind::ThousandsGrouped => group_thousands(n),
        FormatKind::Verbatim => n.to_string(),
    }
}

fn group_thousands(n: f64) -> String {
    let rounded = n.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
