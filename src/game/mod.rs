//! Headless game UI: input events, a text frame, and a stack of screens.
//!
//! Screens never reach into the manager. They answer each event with a
//! [`Transition`] and the [`ScreenManager`] applies it, running the
//! `on_exit`/`on_enter` hooks in order.

pub mod screens;
pub mod widgets;

pub use screens::{GameplayScreen, LoginScreen, MenuScreen};
pub use widgets::{Button, TextInput};

pub const WINDOW_WIDTH: i32 = 800;
pub const WINDOW_HEIGHT: i32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    KeyDown(Key),
    MouseMove { x: i32, y: i32 },
    MouseDown { x: i32, y: i32 },
    MouseUp { x: i32, y: i32 },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

/// Text stand-in for a drawing surface: one entry per drawn line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Stack change requested by the active screen.
pub enum Transition {
    None,
    Push(Box<dyn Screen>),
    Pop,
    Switch(Box<dyn Screen>),
    Quit,
}

/// Lifecycle: `on_enter`, then any number of `handle_event`/`update`/
/// `render`, then `on_exit`.
pub trait Screen {
    fn name(&self) -> &'static str;

    fn on_enter(&mut self) {}

    fn on_exit(&mut self) {}

    fn handle_event(&mut self, event: &Event) -> Transition;

    fn update(&mut self, _dt: f32) {}

    fn render(&self, frame: &mut Frame);
}

/// Owns every screen on the stack; only the top one sees events.
pub struct ScreenManager {
    stack: Vec<Box<dyn Screen>>,
    running: bool,
}

impl Default for ScreenManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenManager {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            running: true,
        }
    }

    pub fn current(&self) -> Option<&dyn Screen> {
        self.stack.last().map(|s| s.as_ref())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_running(&self) -> bool {
        self.running && !self.stack.is_empty()
    }

    pub fn push(&mut self, mut screen: Box<dyn Screen>) {
        tracing::debug!(screen = screen.name(), "push");
        screen.on_enter();
        self.stack.push(screen);
    }

    pub fn pop(&mut self) -> Option<Box<dyn Screen>> {
        let mut top = self.stack.pop()?;
        tracing::debug!(screen = top.name(), "pop");
        top.on_exit();
        Some(top)
    }

    pub fn switch(&mut self, screen: Box<dyn Screen>) {
        self.pop();
        self.push(screen);
    }

    pub fn handle_event(&mut self, event: &Event) {
        if matches!(event, Event::Quit) {
            self.running = false;
            return;
        }
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        match top.handle_event(event) {
            Transition::None => {}
            Transition::Push(screen) => self.push(screen),
            Transition::Pop => {
                self.pop();
            }
            Transition::Switch(screen) => self.switch(screen),
            Transition::Quit => self.running = false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(top) = self.stack.last_mut() {
            top.update(dt);
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        if let Some(top) = self.stack.last() {
            top.render(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
        on_key: Option<Box<dyn Fn() -> Transition>>,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Log) -> Box<dyn Screen> {
            Box::new(Probe { name, log: log.clone(), on_key: None })
        }
    }

    impl Screen for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn on_enter(&mut self) {
            self.log.borrow_mut().push(format!("enter {}", self.name));
        }
        fn on_exit(&mut self) {
            self.log.borrow_mut().push(format!("exit {}", self.name));
        }
        fn handle_event(&mut self, _event: &Event) -> Transition {
            self.on_key.as_ref().map(|f| f()).unwrap_or(Transition::None)
        }
        fn render(&self, frame: &mut Frame) {
            frame.draw(self.name);
        }
    }

    #[test]
    fn test_stack_lifecycle_order() {
        let log: Log = Rc::default();
        let mut manager = ScreenManager::new();
        manager.push(Probe::boxed("menu", &log));
        manager.push(Probe::boxed("pause", &log));
        assert_eq!(manager.depth(), 2);
        assert_eq!(manager.current().map(|s| s.name()), Some("pause"));

        manager.switch(Probe::boxed("options", &log));
        assert_eq!(manager.depth(), 2);
        let popped = manager.pop().unwrap();
        assert_eq!(popped.name(), "options");

        assert_eq!(
            *log.borrow(),
            vec!["enter menu", "enter pause", "exit pause", "enter options", "exit options"]
        );
    }

    #[test]
    fn test_transitions_from_events() {
        let log: Log = Rc::default();
        let inner = log.clone();
        let mut manager = ScreenManager::new();
        manager.push(Box::new(Probe {
            name: "root",
            log: log.clone(),
            on_key: Some(Box::new(move || Transition::Push(Probe::boxed("child", &inner)))),
        }));

        manager.handle_event(&Event::KeyDown(Key::Enter));
        assert_eq!(manager.current().map(|s| s.name()), Some("child"));

        let mut frame = Frame::new();
        manager.render(&mut frame);
        assert_eq!(frame.lines(), ["child".to_string()]);

        manager.handle_event(&Event::Quit);
        assert!(!manager.is_running());
    }

    #[test]
    fn test_empty_manager_is_inert() {
        let mut manager = ScreenManager::new();
        assert!(manager.pop().is_none());
        manager.handle_event(&Event::KeyDown(Key::Enter));
        manager.update(0.1);
        let mut frame = Frame::new();
        manager.render(&mut frame);
        assert!(frame.lines().is_empty());
        assert!(!manager.is_running());
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 10, 20, 5);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(29, 14));
        assert!(!rect.contains(30, 14));
        assert!(!rect.contains(9, 12));
    }
}
