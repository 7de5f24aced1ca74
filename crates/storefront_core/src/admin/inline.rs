//! Inline editing of child rows within a parent's admin form.

use crate::model::ModelKind;
use thiserror::Error;

/// Formset rejection for an inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InlineFormsetError {
    #[error("Please submit at least {min} form(s).")]
    TooFew { min: usize, submitted: usize },
    #[error("Please submit at most {max} form(s).")]
    TooMany { max: usize, submitted: usize },
}

/// Inline declaration for a child model edited through its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAdmin {
    model: ModelKind,
    fk_name: &'static str,
    extra: usize,
    min_num: usize,
    max_num: Option<usize>,
    autocomplete_fields: Vec<&'static str>,
}

impl InlineAdmin {
    pub fn new(model: ModelKind, fk_name: &'static str) -> Self {
        Self {
            model,
            fk_name,
            extra: 3,
            min_num: 0,
            max_num: None,
            autocomplete_fields: Vec::new(),
        }
    }

    pub fn with_extra(mut self, extra: usize) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_min_num(mut self, min_num: usize) -> Self {
        self.min_num = min_num;
        self
    }

    pub fn with_max_num(mut self, max_num: usize) -> Self {
        self.max_num = Some(max_num);
        self
    }

    pub fn with_autocomplete_fields(mut self, fields: &[&'static str]) -> Self {
        self.autocomplete_fields = fields.to_vec();
        self
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    pub fn fk_name(&self) -> &'static str {
        self.fk_name
    }

    pub fn extra(&self) -> usize {
        self.extra
    }

    pub fn min_num(&self) -> usize {
        self.min_num
    }

    pub fn max_num(&self) -> Option<usize> {
        self.max_num
    }

    pub fn autocomplete_fields(&self) -> &[&'static str] {
        &self.autocomplete_fields
    }

    /// Number of blank forms shown on an edit page that already has
    /// `existing` rows.
    pub fn blank_forms(&self, existing: usize) -> usize {
        let wanted = existing.max(self.min_num) + self.extra;
        let shown = match self.max_num {
            Some(max) => wanted.min(max.max(existing)),
            None => wanted,
        };
        shown - existing
    }

    /// Checks the number of non-deleted rows a formset submits.
    pub fn validate_count(&self, submitted: usize) -> Result<(), InlineFormsetError> {
        if submitted < self.min_num {
            return Err(InlineFormsetError::TooFew {
                min: self.min_num,
                submitted,
            });
        }
        if let Some(max) = self.max_num {
            if submitted > max {
                return Err(InlineFormsetError::TooMany { max, submitted });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InlineAdmin, InlineFormsetError};
    use crate::model::ModelKind;

    fn exactly_one() -> InlineAdmin {
        InlineAdmin::new(ModelKind::OrderItem, "order")
            .with_extra(0)
            .with_min_num(1)
            .with_max_num(1)
    }

    #[test]
    fn exactly_one_inline_accepts_single_row_only() {
        let inline = exactly_one();
        assert_eq!(
            inline.validate_count(0),
            Err(InlineFormsetError::TooFew {
                min: 1,
                submitted: 0
            })
        );
        assert!(inline.validate_count(1).is_ok());
        assert_eq!(
            inline.validate_count(2),
            Err(InlineFormsetError::TooMany {
                max: 1,
                submitted: 2
            })
        );
    }

    #[test]
    fn blank_forms_respect_min_and_max() {
        let inline = exactly_one();
        assert_eq!(inline.blank_forms(0), 1);
        assert_eq!(inline.blank_forms(1), 0);

        let open = InlineAdmin::new(ModelKind::OrderItem, "order");
        assert_eq!(open.blank_forms(2), 3);
    }
}
