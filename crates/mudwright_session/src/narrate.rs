//! The narration seam.
//!
//! Rendering first/second/third-person social strings is the job of an
//! external collaborator; the engine treats it as an opaque pure function
//! from a template and participant list to one string per participant plus
//! an observer string for bystanders.

use std::collections::BTreeMap;

use mudwright_foundation::ObjectId;
use mudwright_world::World;

/// The rendered output of one narration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Narration {
    /// One string per participant, in participant order.
    pub participants: Vec<String>,
    /// The string shown to bystanders.
    pub observer: String,
}

/// Renders social templates. Pure; must not mutate the world.
pub trait Narrator {
    /// Renders `template` once per participant plus once for observers.
    ///
    /// Templates may use positional markers for up to two participants
    /// (`%1N`, `%1n`, `%1s`, `%2n`, ...) and named `{key}` substitutions.
    fn render(
        &self,
        template: &str,
        participants: &[ObjectId],
        world: &World,
        substitutions: &BTreeMap<String, String>,
    ) -> Narration;
}

/// A minimal built-in narrator.
///
/// Handles `{key}` substitutions, `%<i>N`/`%<i>n` participant names, and the
/// `%<i>s` verb suffix (empty in second person, `s` in third). Enough to
/// make `say` read naturally end to end; a real game supplies its own
/// implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainNarrator;

impl PlainNarrator {
    fn render_for(
        template: &str,
        participants: &[ObjectId],
        world: &World,
        perspective: Option<usize>,
        substitutions: &BTreeMap<String, String>,
    ) -> String {
        let mut text = template.to_string();
        for (index, &participant) in participants.iter().enumerate().take(2) {
            let position = index + 1;
            let name = world
                .object(participant)
                .and_then(|o| o.name().map(str::to_string))
                .unwrap_or_else(|| "someone".to_string());
            let second_person = perspective == Some(index);
            let (upper, lower, suffix) = if second_person {
                ("You".to_string(), "you".to_string(), "")
            } else {
                (name.clone(), name, "s")
            };
            text = text.replace(&format!("%{position}N"), &upper);
            text = text.replace(&format!("%{position}n"), &lower);
            text = text.replace(&format!("%{position}s"), suffix);
        }
        for (key, value) in substitutions {
            text = text.replace(&format!("{{{key}}}"), value);
        }
        text
    }
}

impl Narrator for PlainNarrator {
    fn render(
        &self,
        template: &str,
        participants: &[ObjectId],
        world: &World,
        substitutions: &BTreeMap<String, String>,
    ) -> Narration {
        let rendered = participants
            .iter()
            .enumerate()
            .map(|(i, _)| Self::render_for(template, participants, world, Some(i), substitutions))
            .collect();
        Narration {
            participants: rendered,
            observer: Self::render_for(template, participants, world, None, substitutions),
        }
    }
}
