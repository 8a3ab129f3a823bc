/// Canned prompts offered while a conversation is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub text: &'static str,
}

const QUICK_ACTIONS: [QuickAction; 3] = [
    QuickAction {
        label: "Show tasks",
        text: "Show my tasks",
    },
    QuickAction {
        label: "Add task",
        text: "Add task ",
    },
    QuickAction {
        label: "Help",
        text: "help",
    },
];

impl QuickAction {
    pub fn all() -> &'static [QuickAction] {
        &QUICK_ACTIONS
    }

    /// One-based, as shown to the user.
    pub fn nth(n: usize) -> Option<QuickAction> {
        n.checked_sub(1).and_then(|i| QUICK_ACTIONS.get(i).copied())
    }
}
