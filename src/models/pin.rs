//! Fixed-length PIN entry buffer.
//!
//! The buffer only ever holds ASCII digits and never more than its
//! configured length. When the final digit arrives the buffer hands the
//! completed PIN out and empties itself, so a completed entry can be
//! submitted exactly once.

use std::fmt;

/// Result of feeding one key into a [`PinBuffer`].
#[derive(Clone, PartialEq, Eq)]
pub enum PinInput {
    /// The digit was appended; the PIN is not complete yet.
    Accepted,
    /// The digit completed the PIN. The buffer is now empty.
    Complete(String),
    /// The key was not a digit, so nothing changed.
    Ignored,
}

impl fmt::Debug for PinInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinInput::Accepted => f.write_str("Accepted"),
            PinInput::Complete(pin) => write!(f, "Complete({})", "*".repeat(pin.len())),
            PinInput::Ignored => f.write_str("Ignored"),
        }
    }
}

/// Digits typed so far on a keypad.
#[derive(Clone, PartialEq, Eq)]
pub struct PinBuffer {
    digits: String,
    length: usize,
}

impl PinBuffer {
    /// Creates an empty buffer for PINs of `length` digits.
    pub fn new(length: usize) -> Self {
        Self {
            digits: String::with_capacity(length),
            length,
        }
    }

    /// Number of digits entered so far.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Returns true if no digits have been entered.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// The configured PIN length.
    pub fn capacity(&self) -> usize {
        self.length
    }

    /// Appends a digit.
    ///
    /// # Examples
    ///
    /// ```
    /// use workclock_kiosk::models::{PinBuffer, PinInput};
    ///
    /// let mut pin = PinBuffer::new(4);
    /// for digit in ['1', '2', '3'] {
    ///     assert_eq!(pin.push(digit), PinInput::Accepted);
    /// }
    /// assert_eq!(pin.push('4'), PinInput::Complete("1234".to_string()));
    /// assert!(pin.is_empty());
    /// ```
    pub fn push(&mut self, key: char) -> PinInput {
        if !key.is_ascii_digit() || self.digits.len() >= self.length {
            return PinInput::Ignored;
        }
        self.digits.push(key);
        if self.digits.len() == self.length {
            PinInput::Complete(std::mem::take(&mut self.digits))
        } else {
            PinInput::Accepted
        }
    }

    /// Removes the last digit. Returns false if the buffer was already empty.
    pub fn backspace(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    /// Discards every digit.
    pub fn clear(&mut self) {
        self.digits.clear();
    }
}

// PINs never reach logs through Debug.
impl fmt::Debug for PinBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinBuffer")
            .field("entered", &self.digits.len())
            .field("length", &self.length)
            .finish()
    }
}
