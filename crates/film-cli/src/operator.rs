//! Terminal prompt used by the interactive conflict policy.

use dialoguer::Select;
use film_match::{Conflict, ConflictOperator, MatchError, Resolution, render_key};

const CHOICES: [(&str, Resolution); 3] = [
    ("Keep the first row", Resolution::KeepFirst),
    ("Keep the second row", Resolution::KeepSecond),
    ("Merge both rows", Resolution::KeepBoth),
];

/// Asks on the terminal which row of a duplicate pair survives.
///
/// Blocks until an answer is given. Without a terminal the prompt fails and
/// the bucket is left unresolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptOperator;

impl ConflictOperator for PromptOperator {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> film_match::Result<Resolution> {
        eprintln!();
        eprintln!("Duplicate {}", render_key(conflict.key));
        for line in describe(conflict) {
            eprintln!("  {line}");
        }
        let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
        let selection = Select::new()
            .with_prompt("Which row should survive?")
            .items(&labels)
            .default(2)
            .interact()
            .map_err(|e| MatchError::Operator(e.to_string()))?;
        CHOICES
            .get(selection)
            .map(|(_, resolution)| *resolution)
            .ok_or_else(|| MatchError::Operator(format!("no choice at position {selection}")))
    }
}

/// One line per differing column: `name: first | second`.
fn describe(conflict: &Conflict<'_>) -> Vec<String> {
    conflict
        .differing_columns()
        .map(|(name, first, second)| {
            format!("{name}: {} | {}", shown(&first.render()), shown(&second.render()))
        })
        .collect()
}

fn shown(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
