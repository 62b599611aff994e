use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::sequence::CodeFormat;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SequenceCounter {
    pub entity_kind: String,
    pub prefix: String,
    pub padding_width: i32,
    pub last_value: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Read-only view for the sequences listing
#[derive(Debug, Serialize)]
pub struct SequenceCounterView {
    pub entity_kind: String,
    pub prefix: String,
    pub padding_width: i32,
    pub last_value: i64,
    pub last_code: Option<String>,
    pub next_code: String,
    pub updated_at: DateTime<Utc>,
}

impl SequenceCounterView {
    /// Renders codes with `configured`, the format allocation uses for this
    /// kind. Kinds no longer configured fall back to the stored prefix/width.
    pub fn new(counter: SequenceCounter, configured: Option<&CodeFormat>) -> Self {
        let format = match configured {
            Some(format) => format.clone(),
            None => CodeFormat::new(
                counter.prefix.clone(),
                usize::try_from(counter.padding_width).unwrap_or(0),
            ),
        };
        let last_code = (counter.last_value > 0).then(|| format.render(counter.last_value));

        Self {
            next_code: format.render(counter.last_value + 1),
            last_code,
            entity_kind: counter.entity_kind,
            prefix: counter.prefix,
            padding_width: counter.padding_width,
            last_value: counter.last_value,
            updated_at: counter.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(last_value: i64) -> SequenceCounter {
        stored("Brand", "BRD", 3, last_value)
    }

    fn stored(kind: &str, prefix: &str, width: i32, last_value: i64) -> SequenceCounter {
        SequenceCounter {
            entity_kind: kind.to_string(),
            prefix: prefix.to_string(),
            padding_width: width,
            last_value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_previews_next_code() {
        let format = CodeFormat::new("BRD", 3);
        let view = SequenceCounterView::new(counter(7), Some(&format));
        assert_eq!(view.last_code.as_deref(), Some("BRD007"));
        assert_eq!(view.next_code, "BRD008");
    }

    #[test]
    fn fresh_counter_has_no_last_code() {
        let view = SequenceCounterView::new(counter(0), None);
        assert_eq!(view.last_code, None);
        assert_eq!(view.next_code, "BRD001");
    }

    #[test]
    fn configured_format_wins_over_stored_one() {
        let format = CodeFormat::new("PRD", 5);
        let view = SequenceCounterView::new(stored("Product", "PRD", 3, 7), Some(&format));
        assert_eq!(view.last_code.as_deref(), Some("PRD00007"));
        assert_eq!(view.next_code, "PRD00008");
        assert_eq!(view.padding_width, 3);
    }

    #[test]
    fn unconfigured_kind_uses_stored_format() {
        let view = SequenceCounterView::new(stored("Warehouse", "WH", 2, 41), None);
        assert_eq!(view.next_code, "WH42");
    }
}
