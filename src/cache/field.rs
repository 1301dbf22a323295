/// Load state of a single lazily populated entity field.
///
/// `Loaded(None)` on a `Field<Option<T>>` means the value was fetched and is
/// genuinely absent, which is different from `Unloaded`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Unloaded,
    Loaded(T),
    /// The last load attempt failed; the value is still unknown.
    Failed(String),
}

impl<T> Field<T> {
    pub fn from_hint(hint: Option<T>) -> Self {
        match hint {
            Some(value) => Field::Loaded(value),
            None => Field::Unloaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Field::Loaded(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Field::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Marks an unknown value as failed; loaded values are kept.
    pub fn fail(&mut self, reason: &str) {
        if !self.is_loaded() {
            *self = Field::Failed(reason.to_string());
        }
    }
}

impl<T: Clone> Field<T> {
    pub fn cloned(&self) -> Option<T> {
        self.get().cloned()
    }
}
