//! Six-box one-time code input used by email and phone verification.
//!
//! Typing advances focus box by box; pasting a full code fills every box at once. The first
//! time the boxes become complete the input emits [`OtpEvent::Submit`], and it never emits it
//! again until [`OtpInput::reset`].

/// Number of boxes.
pub const OTP_LENGTH: usize = 6;

const NOT_NUMERIC: &str = "The code can only contain digits";
const TOO_LONG: &str = "The code has 6 digits";

/// What the view should do after an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpEvent {
    /// Boxes changed; move focus to [`OtpInput::focus`].
    Updated,
    /// Code complete for the first time: verify it.
    Submit(String),
    /// Input refused; boxes unchanged, [`OtpInput::error`] set.
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
    digits: [Option<char>; OTP_LENGTH],
    focus: usize,
    error: Option<&'static str>,
    submitted: bool,
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box contents, `None` for empty boxes.
    pub fn digits(&self) -> &[Option<char>; OTP_LENGTH] {
        &self.digits
    }

    /// Index of the box that should hold focus.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Inline error under the boxes.
    pub fn error(&self) -> Option<&str> {
        self.error
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// The code when all boxes are filled.
    pub fn code(&self) -> Option<String> {
        self.digits.iter().copied().collect()
    }

    /// A keystroke in box `index`.
    ///
    /// An empty `value` clears the box. Only the last typed character counts, so typing over
    /// a filled box replaces its digit.
    pub fn input(&mut self, index: usize, value: &str) -> OtpEvent {
        if index >= OTP_LENGTH {
            return OtpEvent::Rejected;
        }
        let Some(ch) = value.chars().last() else {
            self.digits[index] = None;
            self.focus = index;
            self.error = None;
            return OtpEvent::Updated;
        };
        if !ch.is_ascii_digit() {
            self.error = Some(NOT_NUMERIC);
            return OtpEvent::Rejected;
        }
        self.digits[index] = Some(ch);
        self.error = None;
        self.focus = (index + 1).min(OTP_LENGTH - 1);
        self.complete_or_updated()
    }

    /// Backspace in box `index`: clear it, or step back when it is already empty.
    pub fn backspace(&mut self, index: usize) -> OtpEvent {
        let index = index.min(OTP_LENGTH - 1);
        if self.digits[index].is_some() {
            self.digits[index] = None;
            self.focus = index;
        } else if index > 0 {
            self.digits[index - 1] = None;
            self.focus = index - 1;
        }
        self.error = None;
        OtpEvent::Updated
    }

    /// Clipboard paste into any box.
    ///
    /// Surrounding whitespace is ignored. Anything that is not 1 to 6 digits is rejected and
    /// leaves the boxes untouched; a shorter code fills from the first box.
    pub fn paste(&mut self, text: &str) -> OtpEvent {
        let text = text.trim();
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            self.error = Some(NOT_NUMERIC);
            return OtpEvent::Rejected;
        }
        if text.len() > OTP_LENGTH {
            self.error = Some(TOO_LONG);
            return OtpEvent::Rejected;
        }
        self.digits = [None; OTP_LENGTH];
        for (slot, ch) in self.digits.iter_mut().zip(text.chars()) {
            *slot = Some(ch);
        }
        self.error = None;
        self.focus = text.len().min(OTP_LENGTH - 1);
        self.complete_or_updated()
    }

    /// Empty all boxes and allow another submission (wrong or expired code).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Show a server-side rejection ("invalid code") and clear the boxes for another try.
    pub fn fail(&mut self, message: &'static str) {
        self.reset();
        self.error = Some(message);
    }

    fn complete_or_updated(&mut self) -> OtpEvent {
        match self.code() {
            Some(code) if !self.submitted => {
                self.submitted = true;
                OtpEvent::Submit(code)
            }
            _ => OtpEvent::Updated,
        }
    }
}
