//! Turning a [`TargetDescriptor`] into one element of a [`Snapshot`].
//!
//! A numeric id is looked up directly. Everything else goes through a
//! [`Scorer`], first in a strict pass and then, if nothing scored, in a
//! relaxed one.
use crate::snapshot::{ElementDescriptor, Snapshot};
use crate::target::TargetDescriptor;
use tracing::debug;

const EXACT_TYPE: i64 = 150;
const PARTIAL_TYPE: i64 = 40;
const EXACT_TEXT: i64 = 450;
const ALNUM_TEXT: i64 = 400;
const CONTAINS_TEXT: f64 = 300.0;
const SEGMENT_TEXT: f64 = 200.0;
const COVERED_TEXT: f64 = 100.0;
const WORD_RELAXED: i64 = 15;
const WORD_STRICT: i64 = 25;
const IN_VIEWPORT: i64 = 25;
const TOP_LEFT: i64 = -50;
const EMPTY_TEXT: i64 = -100;

/// Targets longer than this get word-overlap scoring even in the strict pass.
const LONG_TARGET: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Strict,
    Relaxed,
}

/// Scores one candidate against a target. Zero or less means "no match".
pub trait Scorer: Send + Sync {
    fn score(&self, target: &TargetDescriptor, candidate: &ElementDescriptor, pass: Pass) -> i64;
}

/// Type gate, text tiers and geometry adjustments.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScorer;

impl Scorer for DefaultScorer {
    fn score(&self, target: &TargetDescriptor, candidate: &ElementDescriptor, pass: Pass) -> i64 {
        let relaxed = pass == Pass::Relaxed;
        let wanted = target
            .text
            .as_deref()
            .map(normalize)
            .filter(|t| !t.is_empty());
        if wanted.is_none() && target.target_type.is_none() {
            return 0;
        }

        let texts = candidate_texts(candidate);
        if texts.is_empty() && !relaxed {
            return 0;
        }

        let mut score = 0;
        if let Some(wanted_type) = target.target_type.as_deref() {
            if type_matches(wanted_type, candidate) {
                score += EXACT_TYPE;
            } else if relaxed && type_overlaps(wanted_type, candidate) {
                score += PARTIAL_TYPE;
            } else if !relaxed {
                return 0;
            }
        }

        match wanted {
            Some(wanted) => {
                let best = texts
                    .iter()
                    .map(|text| text_score(&wanted, text, relaxed))
                    .max()
                    .unwrap_or(0);
                if best <= 0 {
                    return 0;
                }
                score += best;
            }
            None if score == 0 => return 0,
            None => {}
        }

        let g = &candidate.geometry;
        if g.in_viewport {
            score += IN_VIEWPORT;
        }
        if g.x < 50.0 && g.y < 50.0 {
            score += TOP_LEFT;
        }
        if candidate.is_unlabelled() {
            score += EMPTY_TEXT;
        }
        score
    }
}

/// Lowercase, collapse whitespace and tighten spaces around `/`.
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed.replace(" / ", "/").replace(" /", "/").replace("/ ", "/")
}

/// Display text plus the attributes that commonly carry a control's name.
fn candidate_texts(candidate: &ElementDescriptor) -> Vec<String> {
    let mut texts = vec![normalize(&candidate.text)];
    for name in ["aria-label", "placeholder", "value", "title"] {
        if let Some(value) = candidate.attr(name) {
            texts.push(normalize(value));
        }
    }
    texts.retain(|t| !t.is_empty());
    texts.dedup();
    texts
}

fn type_matches(wanted: &str, c: &ElementDescriptor) -> bool {
    let tag = c.tag_kind.to_lowercase();
    if wanted == c.semantic_type.label() || wanted == tag {
        return true;
    }
    match wanted {
        "button" => tag == "button" || c.attr("class").is_some_and(|cls| cls.contains("btn")),
        "dropdown" => {
            tag == "select"
                || c.attr("role")
                    .is_some_and(|r| matches!(r.trim(), "listbox" | "combobox"))
        }
        _ => false,
    }
}

fn type_overlaps(wanted: &str, c: &ElementDescriptor) -> bool {
    let label = c.semantic_type.label();
    label.contains(wanted) || wanted.contains(label)
}

fn alnum(text: &str) -> String {
    text.chars().filter(char::is_ascii_alphanumeric).collect()
}

fn ratio(weight: f64, part: usize, whole: usize) -> i64 {
    if whole == 0 {
        return 0;
    }
    (weight * part as f64 / whole as f64).round() as i64
}

/// First applicable tier wins; later tiers are never consulted.
fn text_score(wanted: &str, candidate: &str, relaxed: bool) -> i64 {
    let want_len = wanted.chars().count();
    let cand_len = candidate.chars().count();

    if candidate == wanted {
        return EXACT_TEXT;
    }
    let (a, b) = (alnum(candidate), alnum(wanted));
    if !a.is_empty() && a == b {
        return ALNUM_TEXT;
    }
    if candidate.contains(wanted) {
        return ratio(CONTAINS_TEXT, want_len, cand_len);
    }
    if wanted.contains('/') {
        return wanted
            .split('/')
            .filter(|part| part.chars().count() > 3 && candidate.contains(part))
            .map(|part| ratio(SEGMENT_TEXT, part.chars().count(), cand_len))
            .sum();
    }
    if cand_len > 3 && wanted.contains(candidate) {
        return ratio(COVERED_TEXT, cand_len, want_len);
    }
    if relaxed || want_len > LONG_TARGET {
        let words: Vec<&str> = candidate.split(' ').collect();
        let overlap = wanted
            .split(' ')
            .filter(|word| word.chars().count() > 2)
            .filter(|word| words.iter().any(|w| w.contains(word) || word.contains(w)))
            .count() as i64;
        return overlap * if relaxed { WORD_RELAXED } else { WORD_STRICT };
    }
    0
}

/// A candidate and the score it earned in one pass.
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'s> {
    pub element: &'s ElementDescriptor,
    pub score: i64,
}

/// Positive candidates for one pass, best first; ties keep document order.
pub fn rank<'s>(
    snapshot: &'s Snapshot,
    target: &TargetDescriptor,
    scorer: &dyn Scorer,
    pass: Pass,
) -> Vec<Ranked<'s>> {
    let wants_disabled = target
        .text
        .as_deref()
        .is_some_and(|t| t.contains("disabled"));
    let mut ranked: Vec<Ranked<'s>> = snapshot
        .elements
        .iter()
        .filter(|e| wants_disabled || !e.is_disabled)
        .map(|element| Ranked {
            element,
            score: scorer.score(target, element, pass),
        })
        .filter(|r| r.score > 0)
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Scored search: strict pass, then relaxed.
pub fn search<'s>(
    snapshot: &'s Snapshot,
    target: &TargetDescriptor,
    scorer: &dyn Scorer,
) -> Option<&'s ElementDescriptor> {
    for pass in [Pass::Strict, Pass::Relaxed] {
        let ranked = rank(snapshot, target, scorer, pass);
        if let Some(best) = ranked.first() {
            debug!(
                target: "glance.resolve",
                ?pass,
                id = best.element.id,
                score = best.score,
                candidates = ranked.len(),
                "target matched"
            );
            return Some(best.element);
        }
    }
    None
}

/// Direct id lookup, falling back to [`search`].
pub fn resolve<'s>(
    snapshot: &'s Snapshot,
    target: &TargetDescriptor,
    scorer: &dyn Scorer,
) -> Option<&'s ElementDescriptor> {
    if let Some(element) = target.index().and_then(|i| snapshot.element(i)) {
        debug!(target: "glance.resolve", id = element.id, "resolved by id");
        return Some(element);
    }
    search(snapshot, target, scorer)
}
