use super::{Event, Frame, Key, Rect};

pub const DEFAULT_MAX_INPUT_LENGTH: usize = 32;
const CURSOR_BLINK_SECS: f32 = 0.5;

/// Single-line text field with optional masking.
#[derive(Debug, Clone)]
pub struct TextInput {
    pub rect: Rect,
    placeholder: String,
    text: String,
    password: bool,
    max_length: usize,
    pub focused: bool,
    cursor_visible: bool,
    cursor_timer: f32,
}

impl TextInput {
    pub fn new(rect: Rect, placeholder: impl Into<String>) -> Self {
        Self {
            rect,
            placeholder: placeholder.into(),
            text: String::new(),
            password: false,
            max_length: DEFAULT_MAX_INPUT_LENGTH,
            focused: false,
            cursor_visible: true,
            cursor_timer: 0.0,
        }
    }

    /// Show `*` instead of the typed characters.
    pub fn masked(mut self) -> Self {
        self.password = true;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn set_value(&mut self, value: &str) {
        self.text = value.chars().take(self.max_length).collect();
    }

    /// Feed one event; returns the current text when Enter is pressed while
    /// focused.
    pub fn handle_event(&mut self, event: &Event) -> Option<String> {
        match *event {
            Event::MouseDown { x, y } => {
                self.focused = self.rect.contains(x, y);
                None
            }
            Event::KeyDown(key) if self.focused => match key {
                Key::Enter => Some(self.text.clone()),
                Key::Backspace => {
                    self.text.pop();
                    None
                }
                Key::Char(ch) => {
                    if !ch.is_control() && self.text.chars().count() < self.max_length {
                        self.text.push(ch);
                    }
                    None
                }
                Key::Escape | Key::Tab => None,
            },
            _ => None,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.focused {
            self.cursor_timer += dt;
            if self.cursor_timer >= CURSOR_BLINK_SECS {
                self.cursor_timer = 0.0;
                self.cursor_visible = !self.cursor_visible;
            }
        } else {
            self.cursor_visible = false;
            self.cursor_timer = 0.0;
        }
    }

    /// What the field shows: masked text, or the placeholder when empty.
    pub fn display(&self) -> String {
        if self.text.is_empty() {
            self.placeholder.clone()
        } else if self.password {
            "*".repeat(self.text.chars().count())
        } else {
            self.text.clone()
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let cursor = if self.focused && self.cursor_visible { "|" } else { "" };
        let marker = if self.focused { ">" } else { " " };
        frame.draw(format!("{marker} [{}{cursor}]", self.display()));
    }
}

/// Clickable button; fires on release over the button or on its hotkey.
#[derive(Debug, Clone)]
pub struct Button {
    pub rect: Rect,
    label: String,
    hotkey: Option<Key>,
    hover: bool,
    pressed: bool,
}

impl Button {
    pub fn new(rect: Rect, label: impl Into<String>) -> Self {
        Self {
            rect,
            label: label.into(),
            hotkey: None,
            hover: false,
            pressed: false,
        }
    }

    pub fn with_hotkey(mut self, key: Key) -> Self {
        self.hotkey = Some(key);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn is_hovered(&self) -> bool {
        self.hover
    }

    /// Returns true when this event completes a click.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match *event {
            Event::MouseMove { x, y } => {
                self.hover = self.rect.contains(x, y);
                false
            }
            Event::MouseDown { x, y } => {
                if self.rect.contains(x, y) {
                    self.pressed = true;
                }
                false
            }
            Event::MouseUp { x, y } => {
                let was_pressed = self.pressed;
                self.pressed = false;
                was_pressed && self.rect.contains(x, y)
            }
            Event::KeyDown(key) => self.hotkey == Some(key),
            Event::Quit => false,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let (open, close) = match (self.pressed, self.hover) {
            (true, _) => ("[[", "]]"),
            (false, true) => ("<", ">"),
            (false, false) => ("[", "]"),
        };
        frame.draw(format!("  {open} {} {close}", self.label));
    }
}
