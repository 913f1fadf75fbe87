//! Single observable scalar with cross-representation coercion.
//!
//! # Design
//!
//! [`ObservableValue`] stores its content as a [`Scalar`] whose kind is fixed
//! by the initial value. Every accepted write replaces the content and then
//! dispatches the new content, in the field's native representation, through
//! [`ObservableValue::on_value_changed`]. Writes are always reported, even
//! when the new content equals the old one.
//!
//! # Failure Modes
//!
//! - **Incompatible write**: assigning a kind outside the coercion table
//!   (for example a boolean into a number field) returns
//!   [`DataHubError::IncompatibleAssignment`]; content and subscribers are
//!   left untouched.
//! - **Unparseable text**: reads and writes through text degrade to zero.
//! - **Re-entrant write**: a subscriber may write the same value again; the
//!   nested write dispatches before the outer dispatch continues.

use std::cell::RefCell;
use std::fmt;

use crate::error::Result;
use crate::event::EventHandler;
use crate::value::scalar::{FromScalar, Scalar, ScalarKind};

/// A named field's live content plus its change event.
pub struct ObservableValue {
    kind: ScalarKind,
    content: RefCell<Scalar>,
    /// Fired after every successful write with the new content.
    pub on_value_changed: EventHandler<Scalar>,
}

impl ObservableValue {
    /// Creates a value whose kind is the kind of `initial`.
    ///
    /// Construction does not notify.
    #[must_use]
    pub fn new(initial: impl Into<Scalar>) -> Self {
        let initial = initial.into();
        Self {
            kind: initial.kind(),
            content: RefCell::new(initial),
            on_value_changed: EventHandler::new(),
        }
    }

    /// Representation kind fixed at construction.
    #[inline]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Writes `value` after coercing it to this field's kind, then notifies.
    pub fn assign(&self, value: impl Into<Scalar>) -> Result<()> {
        let coerced = value.into().coerce_into(self.kind)?;
        self.store(coerced);
        Ok(())
    }

    /// Writes text, which every kind accepts.
    pub fn assign_text(&self, text: &str) {
        // Text is in every row of the coercion table.
        if let Ok(coerced) = Scalar::from(text).coerce_into(self.kind) {
            self.store(coerced);
        }
    }

    /// Reads the content as `T`.
    #[must_use]
    pub fn get<T: FromScalar>(&self) -> T {
        T::from_scalar(&self.content.borrow())
    }

    /// Reads the content in its human-readable text form.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.borrow().to_text()
    }

    /// Clone of the current content in its native representation.
    #[must_use]
    pub fn snapshot(&self) -> Scalar {
        self.content.borrow().clone()
    }

    /// Compares `value` with the content using this field's equality rules.
    pub fn equals(&self, value: impl Into<Scalar>) -> bool {
        self.content.borrow().loosely_equals(&value.into())
    }

    fn store(&self, content: Scalar) {
        debug_assert_eq!(content.kind(), self.kind);
        // The borrow ends before dispatch so subscribers can read or write.
        let notified = {
            let mut slot = self.content.borrow_mut();
            *slot = content;
            slot.clone()
        };
        self.on_value_changed.dispatch(&notified);
    }
}

impl fmt::Debug for ObservableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("kind", &self.kind)
            .field("content", &*self.content.borrow())
            .field("subscriber_count", &self.on_value_changed.len())
            .finish()
    }
}

impl fmt::Display for ObservableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

macro_rules! impl_partial_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PartialEq<$ty> for ObservableValue {
                fn eq(&self, other: &$ty) -> bool {
                    self.equals(other.clone())
                }
            }
        )*
    };
}

impl_partial_eq!(i32, i64, u32, u64, f32, f64, bool, &str, String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataHubError;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn kind_is_fixed_by_initial_value() {
        assert_eq!(ObservableValue::new(99).kind(), ScalarKind::Number);
        assert_eq!(ObservableValue::new(true).kind(), ScalarKind::Boolean);
        assert_eq!(ObservableValue::new("title").kind(), ScalarKind::Text);
    }

    #[test]
    fn construction_does_not_notify() {
        let value = ObservableValue::new(1);
        assert!(value.on_value_changed.is_empty());
        assert_eq!(value.get::<i32>(), 1);
    }

    #[test]
    fn every_write_notifies_even_when_unchanged() {
        let value = ObservableValue::new(5);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        value.on_value_changed.subscribe(move |_| c.set(c.get() + 1));

        value.assign(5).unwrap();
        value.assign(5).unwrap();
        value.assign_text("5");
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn subscribers_receive_native_representation() {
        let value = ObservableValue::new("unittest");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        value
            .on_value_changed
            .subscribe(move |content| s.borrow_mut().push(content.clone()));

        value.assign(10).unwrap();
        value.assign(true).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![Scalar::from("10"), Scalar::from("true")]
        );
    }

    #[test]
    fn incompatible_write_is_rejected_without_notifying() {
        let value = ObservableValue::new(99);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        value.on_value_changed.subscribe(move |_| c.set(c.get() + 1));

        let err = value.assign(true).unwrap_err();
        assert_eq!(
            err,
            DataHubError::IncompatibleAssignment {
                field: ScalarKind::Number,
                value: ScalarKind::Boolean,
            }
        );
        assert_eq!(value.get::<i32>(), 99);
        assert_eq!(count.get(), 0);

        let flag = ObservableValue::new(false);
        assert!(flag.assign(1).is_err());
        assert!(!flag.get::<bool>());
    }

    #[test]
    fn text_field_reads() {
        let value = ObservableValue::new("unittest");
        value.assign(10).unwrap();
        assert!((value.get::<f32>() - 10.0).abs() <= f32::EPSILON);
        assert_eq!(value.get::<u32>(), 10);
        assert_eq!(value.text(), "10");
        assert!(!value.get::<bool>());

        value.assign(10.01).unwrap();
        assert!((value.get::<f32>() - 10.01).abs() <= f32::EPSILON);
        assert_eq!(value.get::<u32>(), 10);
        assert_eq!(value.text(), "10.01");

        value.assign("tRuE").unwrap();
        assert!(value.get::<bool>());
    }

    #[test]
    fn numeric_field_reads() {
        let value = ObservableValue::new(99);
        value.assign(10.01).unwrap();
        assert!((value.get::<f32>() - 10.01).abs() <= f32::EPSILON);
        assert_eq!(value.get::<u32>(), 10);
        assert_eq!(value.text(), "10.01");
        assert!(value.get::<bool>());

        value.assign("  -4.5e1 units").unwrap();
        assert_eq!(value.get::<f64>(), -45.0);
        assert_eq!(value.get::<i64>(), -45);

        value.assign("garbage").unwrap();
        assert_eq!(value.get::<f64>(), 0.0);
        assert!(!value.get::<bool>());
    }

    #[test]
    fn boolean_field_reads() {
        let value = ObservableValue::new(true);
        assert!(value.get::<f32>() >= f32::EPSILON);
        assert_eq!(value.get::<u32>(), 1);
        assert_eq!(value.text(), "true");

        value.assign("FALSE").unwrap();
        assert!(!value.get::<bool>());
        assert_eq!(value.text(), "false");
    }

    #[test]
    fn equality_rules() {
        let number = ObservableValue::new(99);
        assert!(number == 99);
        assert!(number == 99.0);
        assert!(number == "99");
        assert!(number != 98);

        let text = ObservableValue::new("unittest");
        assert!(text == "unittest");
        assert!(text != "UnitTest");
        assert!(text == false);

        let flag = ObservableValue::new(true);
        assert!(flag == true);
        assert!(flag == "TRUE");
    }

    #[test]
    fn subscriber_can_write_back_without_panicking() {
        let value = Rc::new(ObservableValue::new(0));
        let weak = Rc::downgrade(&value);
        value.on_value_changed.subscribe(move |content| {
            if content.as_f64() > 10.0
                && let Some(value) = weak.upgrade()
            {
                value.assign(10).unwrap();
            }
        });

        value.assign(50).unwrap();
        assert_eq!(value.get::<i32>(), 10);
    }
}
