//! Menus driven as suspendable tasks.
//!
//! A menu presents numbered items and keeps re-prompting until an item
//! completes it or the player aborts. Selection accepts an item number, a
//! title prefix, `$` for the last item, or a bare return for the first; `?`
//! shows help and `.` aborts.

use std::fmt;
use std::sync::Arc;

use mudwright_foundation::Result;

use crate::task::{CommandCtx, Invocation, Outcome, SuspendedTask, TaskStep};

const HELP_MSG: &str = "To activate items, either type the number that appears in brackets \
before each entry, or the first few letters of the title.\n\
If you want the last item in the menu, you can use a dollar ($) sign.\n\
If you want the first item, you can simply press enter.\n\
If you need help, type a question mark (?).\n\
If you wish to abort the menu, type a full stop (.).";

/// What an activated menu item tells the menu to do next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuSignal {
    /// Re-send the menu and keep going.
    Stay,
    /// The menu is finished.
    Done,
}

/// The action behind a menu item.
pub type MenuAction = Arc<dyn Fn(&mut CommandCtx<'_>) -> Result<MenuSignal>>;

#[derive(Clone)]
enum MenuEntry {
    Label(String),
    Item { title: String, action: MenuAction },
}

/// A menu of labels and selectable items.
#[derive(Clone)]
pub struct Menu {
    title: String,
    header: Option<String>,
    entries: Vec<MenuEntry>,
    invalid_selection_msg: String,
    prompt_msg: String,
    abort_msg: String,
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("title", &self.title)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Menu {
    /// Creates an empty menu.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            header: None,
            entries: Vec::new(),
            invalid_selection_msg: "Invalid selection.".to_string(),
            prompt_msg: "Please enter your selection.".to_string(),
            abort_msg: "Aborted.".to_string(),
        }
    }

    /// Sets an explanatory header shown under the title.
    #[must_use]
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = Some(header.to_string());
        self
    }

    /// Adds a non-selectable label.
    pub fn add_label(&mut self, title: &str) {
        self.entries.push(MenuEntry::Label(title.to_string()));
    }

    /// Adds a selectable item.
    pub fn add_item(
        &mut self,
        title: &str,
        action: impl Fn(&mut CommandCtx<'_>) -> Result<MenuSignal> + 'static,
    ) {
        self.entries.push(MenuEntry::Item {
            title: title.to_string(),
            action: Arc::new(action),
        });
    }

    /// Renders the menu as a block of text.
    #[must_use]
    pub fn as_string(&self) -> String {
        let mut text = self.title.clone();
        if let Some(header) = &self.header {
            text.push('\n');
            text.push('\n');
            text.push_str(header);
        }
        let mut number = 0;
        for entry in &self.entries {
            text.push('\n');
            match entry {
                MenuEntry::Item { title, .. } => {
                    number += 1;
                    text.push_str(&format!("[{number}] {title}"));
                }
                MenuEntry::Label(title) => text.push_str(&format!("-- {title} --")),
            }
        }
        text.push('\n');
        text.push_str(&self.prompt_msg);
        text
    }

    /// Sends the menu to the session.
    pub fn send(&self, ctx: &mut CommandCtx<'_>) {
        ctx.message(&self.as_string());
    }

    /// Sends the menu and returns the task that will drive it.
    #[must_use]
    pub fn start(self, ctx: &mut CommandCtx<'_>) -> Invocation {
        self.send(ctx);
        Invocation::Await(Box::new(MenuTask { menu: self }))
    }

    fn items(&self) -> impl Iterator<Item = (&str, &MenuAction)> {
        self.entries.iter().filter_map(|entry| match entry {
            MenuEntry::Item { title, action } => Some((title.as_str(), action)),
            MenuEntry::Label(_) => None,
        })
    }

    /// Finds the item a selection string refers to.
    ///
    /// An empty string selects the first item, since every title starts with
    /// the empty prefix.
    fn matched(&self, selection: &str) -> Option<MenuAction> {
        let items: Vec<_> = self.items().collect();
        if items.is_empty() {
            return None;
        }
        if let Ok(number) = selection.parse::<usize>() {
            return items
                .get(number.checked_sub(1)?)
                .map(|(_, action)| Arc::clone(action));
        }
        if selection == "$" {
            return items.last().map(|(_, action)| Arc::clone(action));
        }
        let lowered = selection.to_lowercase();
        items
            .iter()
            .find(|(title, _)| title.to_lowercase().starts_with(&lowered))
            .map(|(_, action)| Arc::clone(action))
    }
}

/// The suspendable task driving one menu.
struct MenuTask {
    menu: Menu,
}

impl SuspendedTask for MenuTask {
    fn resume(&mut self, ctx: &mut CommandCtx<'_>, input: &str) -> Result<TaskStep> {
        let selection = input.trim();
        if selection == "." {
            let abort = self.menu.abort_msg.clone();
            ctx.message(&abort);
            return Ok(TaskStep::Completed(Outcome::Completed));
        }
        if selection == "?" {
            ctx.message(HELP_MSG);
            self.menu.send(ctx);
            return Ok(TaskStep::Suspended);
        }
        match self.menu.matched(selection) {
            Some(action) => match action(ctx)? {
                MenuSignal::Done => Ok(TaskStep::Completed(Outcome::Completed)),
                MenuSignal::Stay => {
                    self.menu.send(ctx);
                    Ok(TaskStep::Suspended)
                }
            },
            None => {
                let invalid = self.menu.invalid_selection_msg.clone();
                ctx.message(&invalid);
                self.menu.send(ctx);
                Ok(TaskStep::Suspended)
            }
        }
    }
}
