//! Field-by-field entry and editing of entities.
//!
//! The entity is edited as its serialized field map. After every answer the
//! whole map is decoded again, so a field holding an unparseable number or
//! decimal is caught immediately and asked again, with the previous value
//! restored.

use atlas_types::{Entity, Record};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::NavResult;
use crate::prompt::Prompter;
use crate::selection::{parse_text, Flow, TextInput};

/// `countryCode` -> `Country Code`.
pub fn field_label(field: &str) -> String {
    let mut label = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            label.push(' ');
            label.push(c);
        } else {
            label.push(c);
        }
    }
    label
}

/// Text shown as the prefilled answer for `value`.
fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert an answer to the JSON type the field currently holds.
fn coerce(current: &Value, answer: &str) -> Option<Value> {
    match current {
        Value::Number(_) => {
            if let Ok(n) = answer.parse::<i64>() {
                Some(Value::Number(n.into()))
            } else if let Ok(n) = answer.parse::<u64>() {
                Some(Value::Number(n.into()))
            } else {
                answer
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
        }
        Value::Bool(_) => answer.parse::<bool>().ok().map(Value::Bool),
        Value::Null if answer.is_empty() => Some(Value::Null),
        _ => Some(Value::String(answer.to_string())),
    }
}

fn decode<E: Entity>(fields: &Map<String, Value>) -> Result<E, serde_json::Error> {
    serde_json::from_value(Value::Object(fields.clone()))
}

/// Walk `fields` of `map` in order, asking for each one.
///
/// `<` goes to the previous field (or backs out before the first), `/`
/// abandons.
async fn walk<E: Entity>(
    prompter: &dyn Prompter,
    mut map: Map<String, Value>,
    fields: &[String],
    prefill: bool,
) -> NavResult<Flow<E>> {
    let mut index = 0;
    while index < fields.len() {
        let field = &fields[index];
        let current = map.get(field).cloned().unwrap_or(Value::Null);
        let initial = display(&current);
        let label = field_label(field);
        let answer = prompter
            .ask(&label, prefill.then_some(initial.as_str()))
            .await?;

        let text = match parse_text(&answer) {
            TextInput::MainMenu => return Ok(Flow::MainMenu),
            TextInput::Back if index == 0 => return Ok(Flow::Back),
            TextInput::Back => {
                index -= 1;
                continue;
            }
            TextInput::Text(text) => text,
        };

        let Some(value) = coerce(&current, &text) else {
            prompter.warn(&format!("{label} must be a {}", type_name(&current)));
            continue;
        };
        map.insert(field.clone(), value);
        match decode::<E>(&map) {
            Ok(_) => index += 1,
            Err(e) => {
                debug!(field = %field, error = %e, "rejected field value");
                prompter.warn(&format!("Invalid value for {label}: {e}"));
                map.insert(field.clone(), current);
            }
        }
    }
    Ok(Flow::Proceed(decode::<E>(&map).map_err(|e| {
        atlas_types::TypeError::Serialization(e.to_string())
    })?))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "number",
        Value::Bool(_) => "true or false",
        _ => "text",
    }
}

fn field_map<E: Entity>(entity: &E) -> NavResult<Map<String, Value>> {
    match Record::from_entity(entity)?.entity {
        Value::Object(map) => Ok(map),
        other => Err(atlas_types::TypeError::Serialization(format!(
            "{} serialized as {other}, not an object",
            E::NAME
        ))
        .into()),
    }
}

/// Show `entity`'s key fields and ask for every other field, prefilled with
/// its current value. Key fields never change, so the result lands on the
/// same key.
pub async fn edit_entity<E: Entity>(prompter: &dyn Prompter, entity: &E) -> NavResult<Flow<E>> {
    let map = field_map(entity)?;
    for field in E::KEY_FIELDS {
        if let Some(value) = map.get(*field) {
            prompter.say(&format!("{}: {}", field_label(field), display(value)));
        }
    }
    let fields: Vec<String> = map
        .keys()
        .filter(|k| !E::KEY_FIELDS.contains(&k.as_str()))
        .cloned()
        .collect();
    walk(prompter, map, &fields, true).await
}

/// Ask for `fields` of a new entity, starting from `template`.
///
/// Answers are not prefilled; the template only supplies the fields that are
/// not asked and the JSON type of each asked field.
pub async fn fill_entity<E: Entity>(
    prompter: &dyn Prompter,
    template: &E,
    fields: &[&str],
) -> NavResult<Flow<E>> {
    let map = field_map(template)?;
    let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    walk(prompter, map, &fields, false).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use atlas_types::{Decimal, Destination, Education};
    use std::str::FromStr;

    fn paris() -> Destination {
        Destination {
            place_id: "paris123".into(),
            name: "Paris".into(),
            country: "France".into(),
            country_code: "FR".into(),
            latitude: Decimal::from_str("48.856614").unwrap(),
            longitude: Decimal::from_str("2.3522219").unwrap(),
            kind: "locality".into(),
        }
    }

    #[test]
    fn labels_split_camel_case() {
        assert_eq!(field_label("countryCode"), "Country Code");
        assert_eq!(field_label("type"), "Type");
        assert_eq!(field_label("logoUrl"), "Logo Url");
    }

    #[tokio::test]
    async fn unchanged_answers_keep_the_entity() {
        // name, country, countryCode, latitude, longitude, type
        let prompter = ScriptedPrompter::new(["", "", "", "", "", ""]);
        let edited = edit_entity(&prompter, &paris()).await.unwrap();
        assert_eq!(edited, Flow::Proceed(paris()));
        assert!(prompter.saw("Place Id: paris123"));
    }

    #[tokio::test]
    async fn invalid_decimal_is_asked_again() {
        let prompter =
            ScriptedPrompter::new(["Paris Centre", "", "", "north", "48.8566140", "", ""]);
        let Flow::Proceed(edited) = edit_entity(&prompter, &paris()).await.unwrap() else {
            panic!("expected an edited destination");
        };
        assert_eq!(edited.name, "Paris Centre");
        assert_eq!(edited.latitude.to_string(), "48.8566140");
        assert_eq!(edited.place_id, "paris123");
        assert!(prompter.saw("Invalid value for Latitude"));
    }

    #[tokio::test]
    async fn back_returns_to_the_previous_field() {
        // name -> "Lutece", country -> "<", name again -> "Paris", then the rest
        let prompter = ScriptedPrompter::new(["Lutece", "<", "Paris", "", "", "", "", ""]);
        let Flow::Proceed(edited) = edit_entity(&prompter, &paris()).await.unwrap() else {
            panic!("expected an edited destination");
        };
        assert_eq!(edited.name, "Paris");
    }

    #[tokio::test]
    async fn back_at_first_field_and_main_menu_leave() {
        let prompter = ScriptedPrompter::new(["<"]);
        assert_eq!(edit_entity(&prompter, &paris()).await.unwrap(), Flow::Back);

        let prompter = ScriptedPrompter::new(["", "/"]);
        assert_eq!(edit_entity(&prompter, &paris()).await.unwrap(), Flow::MainMenu);
    }

    #[tokio::test]
    async fn fill_builds_a_new_entity() {
        let template = Education {
            id: "e1".into(),
            school: String::new(),
            level: String::new(),
            year: String::new(),
            major: String::new(),
            gpa: Decimal::ZERO,
            logo_url: String::new(),
        };
        let prompter =
            ScriptedPrompter::new(["MIT", "BSc", "2015", "Physics", "four", "3.85"]);
        let fields = ["school", "level", "year", "major", "gpa"];
        let Flow::Proceed(entry) = fill_entity(&prompter, &template, &fields).await.unwrap()
        else {
            panic!("expected an education entry");
        };
        assert_eq!(entry.id, "e1");
        assert_eq!(entry.school, "MIT");
        assert_eq!(entry.gpa, Decimal::from_str("3.85").unwrap());
        assert!(prompter.saw("Invalid value for Gpa"));
    }
}
