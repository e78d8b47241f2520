//! Date lookup next to human-readable labels such as "Last updated:" or
//! "Laatst bijgewerkt:".

use crate::date::normalize;
use crate::extract::DateCandidate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Label patterns in priority order, Dutch first.
pub const LABEL_PATTERNS: &[&str] = &[
    r"laatst\s+bijgewerkt",
    r"laatst\s+geüpdatet",
    r"bijgewerkt\s+op",
    r"update(?:d)?\s+on",
    r"last\s+updated",
    r"last\s+modified",
    r"gepubliceerd\s+op",
    r"published\s+on",
];

/// Characters after the label handed to the normalizer.
const WINDOW_CHARS: usize = 80;

static LABELS: Lazy<Vec<Regex>> = Lazy::new(|| {
    LABEL_PATTERNS
        .iter()
        .filter_map(|p| {
            let src = format!(r"(?i)(?P<label>{p})[:\s\-–]*(?P<tail>.{{0,{WINDOW_CHARS}}})");
            match Regex::new(&src) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(pattern = p, error=%e, "label pattern failed to compile");
                    None
                }
            }
        })
        .collect()
});

/// Search whitespace-collapsed visible text for the first label followed by a
/// parseable date.
///
/// ```
/// use lastmod_web::label::find_date_near_label;
///
/// let found = find_date_near_label("Home Laatst bijgewerkt: 3 maart 2022 Contact").unwrap();
/// assert_eq!(found.iso_date, "2022-03-03T00:00:00+00:00");
/// assert_eq!(found.found_where, "text_label:Laatst bijgewerkt");
/// ```
pub fn find_date_near_label(visible_text: &str) -> Option<DateCandidate> {
    for re in LABELS.iter() {
        // FIXME: a label whose first occurrence has no date hides later ones.
        let Some(caps) = re.captures(visible_text) else {
            continue;
        };
        let (Some(label), Some(tail)) = (caps.name("label"), caps.name("tail")) else {
            continue;
        };
        if let Some(iso_date) = normalize(tail.as_str()) {
            return Some(DateCandidate {
                iso_date,
                found_where: format!("text_label:{}", label.as_str()),
            });
        }
        tracing::debug!(label = label.as_str(), window = tail.as_str(), "label.no_date");
    }
    None
}
