use slint::SharedString;

/// The canvas's single selected element.
///
/// Selection is orthogonal to the gesture state: it survives idle periods
/// and is only replaced by a press, a click, or an explicit clear.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Selection {
    selected: Option<SharedString>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`. Returns whether the selection changed.
    pub fn select(&mut self, id: impl Into<SharedString>) -> bool {
        let id = id.into();
        if self.selected.as_ref() == Some(&id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Replace the selection with `id`, or clear it for `None`.
    pub fn set(&mut self, id: Option<SharedString>) -> bool {
        match id {
            Some(id) => self.select(id),
            None => self.clear(),
        }
    }

    /// Clear the current selection. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn get(&self) -> Option<&SharedString> {
        self.selected.as_ref()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    /// Drop the selection if it names an element `exists` no longer knows.
    pub fn retain<F>(&mut self, exists: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        let missing = self.selected.as_ref().is_some_and(|id| !exists(id.as_str()));
        missing && self.clear()
    }
}
