//! Normalisation of provider summary documents into the canonical
//! [`Summary`].
//!
//! The provider emits two shapes. The *sectioned* form is
//! `{"sections": [{"title": "...", "bullets": [...]} | {"title": "...", "paragraph": "..."}]}`
//! and sections are classified by case-insensitive substring match on their
//! title. The *flat* form exposes the canonical fields directly, under either
//! snake_case or title-case keys.

use serde_json::{Map, Value};

use crate::{Error, Result, meeting::Summary};

/// Paragraphs at or below this many characters are not considered a usable
/// stand-in for a missing short summary.
const MIN_FALLBACK_PARAGRAPH: usize = 20;

/// Parse a fetched summary body. Accepts a JSON object, or a JSON string whose
/// contents are themselves a JSON object.
pub fn parse_document(body: &str) -> Result<Value> {
  let value: Value = serde_json::from_str(body)?;
  let value = match value {
    Value::String(inner) => serde_json::from_str(&inner)?,
    other => other,
  };
  if value.is_object() {
    Ok(value)
  } else {
    Err(Error::SummaryNotObject)
  }
}

/// Normalise a parsed summary document. `duration` (seconds) is only used to
/// synthesise a short summary from the speaker list.
pub fn normalize(doc: &Value, duration: Option<u64>) -> Result<Summary> {
  let obj = doc.as_object().ok_or(Error::SummaryNotObject)?;
  match obj.get("sections") {
    None | Some(Value::Null) => Ok(normalize_flat(obj)),
    Some(Value::Array(sections)) => Ok(normalize_sections(sections, duration)),
    Some(_) => Err(Error::SectionsNotList),
  }
}

// ─── Sectioned form ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionClass {
  Agenda,
  KeyPoints,
  ActionItems,
  ShortSummary,
  Speakers,
}

/// Order matters: "Key Points Summary" is a key-points section.
fn classify(title: &str) -> Option<SectionClass> {
  let title = title.to_lowercase();
  if title.contains("agenda") {
    Some(SectionClass::Agenda)
  } else if title.contains("key") || title.contains("point") {
    Some(SectionClass::KeyPoints)
  } else if title.contains("action") {
    Some(SectionClass::ActionItems)
  } else if title.contains("summary") {
    Some(SectionClass::ShortSummary)
  } else if title.contains("speaker") {
    Some(SectionClass::Speakers)
  } else {
    None
  }
}

struct Section<'a> {
  title:     &'a str,
  bullets:   Vec<String>,
  paragraph: Option<&'a str>,
}

impl<'a> Section<'a> {
  fn from_value(value: &'a Value) -> Self {
    Self {
      title:     value.get("title").and_then(Value::as_str).unwrap_or(""),
      bullets:   string_list(value.get("bullets")),
      paragraph: value
        .get("paragraph")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty()),
    }
  }
}

fn normalize_sections(sections: &[Value], duration: Option<u64>) -> Summary {
  let sections: Vec<Section<'_>> =
    sections.iter().map(Section::from_value).collect();
  let mut summary = Summary::default();

  // Later sections of the same class replace earlier ones.
  for section in &sections {
    match classify(section.title) {
      Some(SectionClass::Agenda) => summary.agenda = section.bullets.clone(),
      Some(SectionClass::KeyPoints) => {
        summary.key_points = section.bullets.clone()
      }
      Some(SectionClass::ActionItems) => {
        summary.action_items = section.bullets.clone()
      }
      Some(SectionClass::ShortSummary) => {
        summary.short_summary = match section.paragraph {
          Some(p) => p.to_owned(),
          None => section.bullets.join(" "),
        };
      }
      Some(SectionClass::Speakers) => summary.speakers = section.bullets.clone(),
      None => {}
    }
  }

  if summary.short_summary.is_empty()
    && let Some(p) = sections
      .iter()
      .filter_map(|s| s.paragraph)
      .find(|p| p.chars().count() > MIN_FALLBACK_PARAGRAPH)
  {
    summary.short_summary = p.to_owned();
  }

  if summary.short_summary.is_empty() && !summary.speakers.is_empty() {
    summary.short_summary = participants_sentence(&summary.speakers, duration);
  }

  summary
}

/// `Meeting with participants: Alice, Bob for 2 minutes and 5 seconds.`
fn participants_sentence(speakers: &[String], duration: Option<u64>) -> String {
  let length = match duration {
    Some(secs) if secs > 0 => {
      format!(" for {} minutes and {} seconds", secs / 60, secs % 60)
    }
    _ => String::new(),
  };
  format!("Meeting with participants: {}{length}.", speakers.join(", "))
}

// ─── Flat form ───────────────────────────────────────────────────────────────

fn normalize_flat(obj: &Map<String, Value>) -> Summary {
  Summary {
    agenda:        first_list(obj, &["agenda", "Agenda"]),
    key_points:    first_list(obj, &["key_points", "Key Points"]),
    action_items:  first_list(obj, &["action_items", "Action Items"]),
    short_summary: first_text(obj, &["short_summary", "Short Summary"]),
    speakers:      first_list(obj, &["speakers", "Speakers"]),
  }
}

fn first_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
  keys
    .iter()
    .filter_map(|k| obj.get(*k))
    .find(|v| !v.is_null())
    .map(|v| string_list(Some(v)))
    .unwrap_or_default()
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> String {
  keys
    .iter()
    .filter_map(|k| obj.get(*k).and_then(Value::as_str))
    .find(|s| !s.is_empty())
    .map(str::to_owned)
    .unwrap_or_default()
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// A list of strings; scalars inside the list are stringified and a bare
/// non-empty string is treated as a one-element list.
fn string_list(value: Option<&Value>) -> Vec<String> {
  match value {
    Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
    Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
    _ => Vec::new(),
  }
}

fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn sectioned_key_points() {
    let doc = json!({
      "sections": [{ "title": "Key Points", "bullets": ["a", "b"] }]
    });
    let s = normalize(&doc, None).unwrap();
    assert_eq!(s.key_points, ["a", "b"]);
    assert!(s.agenda.is_empty());
  }

  #[test]
  fn sectioned_classification_is_case_insensitive() {
    let doc = json!({
      "sections": [
        { "title": "AGENDA", "bullets": ["Intro", "Roadmap"] },
        { "title": "action items", "bullets": ["Ship it"] },
        { "title": "Short Summary", "paragraph": "We agreed to ship." },
        { "title": "Speakers", "bullets": ["Alice"] },
      ]
    });
    let s = normalize(&doc, Some(60)).unwrap();
    assert_eq!(s.agenda, ["Intro", "Roadmap"]);
    assert_eq!(s.action_items, ["Ship it"]);
    assert_eq!(s.short_summary, "We agreed to ship.");
    assert_eq!(s.speakers, ["Alice"]);
  }

  #[test]
  fn summary_section_joins_bullets_without_paragraph() {
    let doc = json!({
      "sections": [{ "title": "Summary", "bullets": ["One.", "Two."] }]
    });
    let s = normalize(&doc, None).unwrap();
    assert_eq!(s.short_summary, "One. Two.");
  }

  #[test]
  fn short_summary_falls_back_to_long_paragraph() {
    let doc = json!({
      "sections": [
        { "title": "Notes", "paragraph": "too short" },
        { "title": "Discussion", "paragraph": "The team reviewed the launch checklist." },
      ]
    });
    let s = normalize(&doc, None).unwrap();
    assert_eq!(s.short_summary, "The team reviewed the launch checklist.");
  }

  #[test]
  fn short_summary_synthesised_from_speakers() {
    let doc = json!({
      "sections": [
        { "title": "Agenda", "bullets": ["Intro"] },
        { "title": "Speakers", "bullets": ["Alice", "Bob"] },
      ]
    });
    let s = normalize(&doc, Some(125)).unwrap();
    assert_eq!(s.agenda, ["Intro"]);
    assert_eq!(s.speakers, ["Alice", "Bob"]);
    assert_eq!(
      s.short_summary,
      "Meeting with participants: Alice, Bob for 2 minutes and 5 seconds."
    );
  }

  #[test]
  fn synthesised_summary_omits_unknown_duration() {
    let doc = json!({ "sections": [{ "title": "Speakers", "bullets": ["Alice"] }] });
    let s = normalize(&doc, None).unwrap();
    assert_eq!(s.short_summary, "Meeting with participants: Alice.");
  }

  #[test]
  fn flat_short_summary() {
    let doc = json!({ "short_summary": "x" });
    let s = normalize(&doc, None).unwrap();
    assert_eq!(s.short_summary, "x");
    assert!(s.key_points.is_empty());
  }

  #[test]
  fn flat_title_case_keys() {
    let doc = json!({
      "Agenda": ["a"],
      "Key Points": ["k"],
      "Action Items": ["do"],
      "Short Summary": "short",
      "Speakers": ["S"],
    });
    let s = normalize(&doc, None).unwrap();
    assert_eq!(s.agenda, ["a"]);
    assert_eq!(s.key_points, ["k"]);
    assert_eq!(s.action_items, ["do"]);
    assert_eq!(s.short_summary, "short");
    assert_eq!(s.speakers, ["S"]);
  }

  #[test]
  fn non_list_sections_is_rejected() {
    let doc = json!({ "sections": "nope" });
    assert!(matches!(normalize(&doc, None), Err(Error::SectionsNotList)));
  }

  #[test]
  fn parse_accepts_json_encoded_string() {
    let body = serde_json::to_string(&json!({"short_summary": "x"}).to_string()).unwrap();
    let doc = parse_document(&body).unwrap();
    assert_eq!(doc["short_summary"], "x");
  }

  #[test]
  fn parse_rejects_non_object() {
    assert!(matches!(parse_document("[1,2]"), Err(Error::SummaryNotObject)));
    assert!(parse_document("not json").is_err());
  }
}
